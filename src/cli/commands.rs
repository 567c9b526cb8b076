//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trello Airdrop snap-in CLI
#[derive(Parser, Debug)]
#[command(name = "trello-airdrop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Trello API base URL override (for local mocks)
    #[arg(long, global = true)]
    pub trello_base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the snap-in HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Invoke a single function with an event file
    Invoke {
        /// Function name (e.g. can_extract, extraction)
        #[arg(short, long)]
        function: String,

        /// Path to the event JSON (a single event or an array)
        #[arg(short, long)]
        event: PathBuf,

        /// State file for resumable extraction runs
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Inline state JSON (takes precedence over --state)
        #[arg(long)]
        state_json: Option<String>,
    },

    /// Print the external domain metadata
    Metadata,

    /// Print the initial domain mapping
    Mapping,
}
