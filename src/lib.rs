// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Trello Airdrop Snap-in
//!
//! A Rust-native DevRev Airdrop snap-in that extracts Trello boards,
//! cards, users and attachments and pushes them into DevRev's sync
//! pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Snap-in HTTP server / CLI                       │
//! │        POST /handle/sync → dispatch(function_name)              │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │
//! ┌──────────────┬────────────────┴──────────────┬─────────────────┐
//! │  Validation  │        Extraction workers     │   Generators    │
//! ├──────────────┼───────────────────────────────┼─────────────────┤
//! │ can_extract  │ sync units │ data │ metadata  │ domain metadata │
//! │ can_push_data│ attachments (running → done   │ initial mapping │
//! │ check_auth   │   | error | timeout)          │                 │
//! └──────────────┴───────────────┬───────────────┴─────────────────┘
//!                                │
//! ┌──────────┬──────────┬────────┴────────┬──────────┬─────────────┐
//! │  Trello  │   HTTP   │   Pagination    │  State   │  Callback   │
//! │  client  │ retry/RL │ before cursor   │ manager  │  events     │
//! └──────────┴──────────┴─────────────────┴──────────┴─────────────┘
//! ```
//!
//! Every extraction worker terminates in exactly one callback event
//! (`*_DONE`, `*_ERROR` or `*_DELAY`); rate limits surface as delay
//! events rather than in-process retries.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the snap-in
pub mod error;

/// Event envelope and shared types
pub mod types;

/// Credential parsing
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Trello API client and models
pub mod trello;

/// Before-cursor pagination
pub mod pagination;

/// Record normalization
pub mod normalize;

/// Item repositories
pub mod repo;

/// Extraction run state
pub mod state;

/// Extractor events and callback emission
pub mod events;

/// Worker adapter and task runner
pub mod adapter;

/// Extraction workers
pub mod workers;

/// Domain metadata and mapping generators
pub mod metadata;

/// Snap-in function handlers
pub mod functions;

/// Command-line interface and HTTP server
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
