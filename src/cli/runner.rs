//! CLI command execution

use super::commands::{Cli, Commands};
use super::server::{serve, ServerConfig};
use crate::adapter::WorkerOptions;
use crate::error::{Error, Result};
use crate::functions::{dispatch, FunctionContext};
use crate::metadata::{external_domain_metadata, initial_domain_mapping};
use crate::types::AirdropEvent;
use serde_json::Value;

/// Executes the parsed CLI command
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for a parsed command line
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    fn function_context(&self) -> FunctionContext {
        let mut options = WorkerOptions::default();
        if let Some(base_url) = &self.cli.trello_base_url {
            options.trello_base_url = base_url.clone();
        }
        FunctionContext {
            options,
            ..FunctionContext::default()
        }
    }

    /// Run the selected command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Serve { port } => {
                let config = ServerConfig {
                    context: self.function_context(),
                };
                serve(config, *port).await
            }

            Commands::Invoke {
                function,
                event,
                state,
                state_json,
            } => {
                let contents = std::fs::read_to_string(event)?;
                let events = parse_events(&contents)?;

                let mut ctx = self.function_context();
                ctx.state_path = state.clone();
                ctx.state_json = state_json.clone();

                let result = dispatch(function, &events, &ctx).await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(())
            }

            Commands::Metadata => {
                println!("{}", serde_json::to_string_pretty(&external_domain_metadata())?);
                Ok(())
            }

            Commands::Mapping => {
                println!("{}", serde_json::to_string_pretty(&initial_domain_mapping())?);
                Ok(())
            }
        }
    }
}

/// Accept either one event object or an array of events
fn parse_events(contents: &str) -> Result<Vec<AirdropEvent>> {
    let value: Value = serde_json::from_str(contents)?;
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        _ => Err(Error::invalid_event("event file must hold an object or array")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_event() {
        let events = parse_events(r#"{"payload": {}}"#).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_parse_event_array() {
        let events = parse_events(r#"[{"payload": {}}, {"payload": {}}]"#).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_rejects_scalars() {
        assert!(parse_events("42").is_err());
    }
}
