//! Extraction state types
//!
//! One worker run owns one [`ExtractionState`]. It round-trips through
//! JSON so a `CONTINUE` event can resume where the previous invocation
//! stopped (pagination cursor, completed stages, incremental watermark).

use serde::{Deserialize, Serialize};

/// Progress of a single extraction stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageState {
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Progress of the cards stage, including the pagination cursor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardsState {
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `before` cursor of the next page to fetch, cleared when the walk ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Watermark applied during the last incremental sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_since: Option<String>,
}

/// Full state of an extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionState {
    #[serde(default)]
    pub sync_units: StageState,
    #[serde(default)]
    pub users: StageState,
    #[serde(default)]
    pub cards: CardsState,
    #[serde(default)]
    pub attachments: StageState,
    /// Start time of the last successful sync, used as the incremental watermark
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_successful_sync_started: Option<String>,
}

impl ExtractionState {
    /// Whether both data stages finished
    pub fn data_complete(&self) -> bool {
        self.users.completed && self.cards.completed
    }
}
