//! Snap-in function handlers
//!
//! One module per function, each taking the incoming event slice and
//! returning the `function_result` JSON. The dispatch table here is the
//! single place function names are mapped to handlers.

mod can_extract;
mod can_push_data;
mod check_auth;
mod extraction;
mod fetch_board_cards;
mod fetch_boards;
mod fetch_organization_members;
mod health_check;
mod metadata;

use crate::adapter::WorkerOptions;
use crate::error::{Error, Result};
use crate::state::StateManager;
use crate::trello::TrelloClient;
use crate::types::AirdropEvent;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::path::PathBuf;

/// Shared configuration handed to every handler
#[derive(Debug, Clone, Default)]
pub struct FunctionContext {
    /// Options for spawned extraction workers (timeout, batch size,
    /// Trello base URL)
    pub options: WorkerOptions,
    /// State file for local runs; server runs stay in memory
    pub state_path: Option<PathBuf>,
    /// Inline state JSON, taking precedence over the state file
    pub state_json: Option<String>,
}

impl FunctionContext {
    /// Build a Trello client for an event using the configured base URL
    pub fn trello_client(&self, event: &AirdropEvent) -> Result<TrelloClient> {
        TrelloClient::from_connection_data_with_base_url(
            event.connection_key()?,
            self.options.trello_base_url.clone(),
        )
    }

    /// Build the state manager for a worker run
    pub fn state_manager(&self) -> Result<StateManager> {
        if let Some(json) = &self.state_json {
            StateManager::from_json(json)
        } else if let Some(path) = &self.state_path {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }
}

/// Current time in the ISO-8601 shape responses carry
pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Take the first event, rejecting an empty slice
pub(crate) fn first_event(events: &[AirdropEvent]) -> Result<&AirdropEvent> {
    events.first().ok_or(Error::NoEvents)
}

/// Dispatch an invocation to the named function
pub async fn dispatch(
    name: &str,
    events: &[AirdropEvent],
    ctx: &FunctionContext,
) -> Result<Value> {
    match name {
        "health_check" => health_check::handle(events).await,
        "can_extract" => can_extract::handle(events).await,
        "can_push_data" => can_push_data::handle(events).await,
        "check_auth" => check_auth::handle(events, ctx).await,
        "fetch_board_cards" => fetch_board_cards::handle(events, ctx).await,
        "fetch_boards" => fetch_boards::handle(events, ctx).await,
        "fetch_organization_members" => fetch_organization_members::handle(events, ctx).await,
        "get_external_domain_metadata" => metadata::handle_metadata(events).await,
        "get_initial_domain_mapping" => metadata::handle_mapping(events).await,
        "extraction" => extraction::handle(events, ctx).await,
        other => Err(Error::UnknownFunction {
            name: other.to_string(),
        }),
    }
}
