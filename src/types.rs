//! Common types used throughout the snap-in
//!
//! This module contains the Airdrop event envelope and shared type
//! aliases. Every field the platform may omit is an explicit `Option`
//! with a presence-check helper, so handlers validate the envelope
//! exhaustively instead of reaching through missing fields.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Event Type
// ============================================================================

/// Airdrop extraction event types.
///
/// Anything outside the extraction vocabulary round-trips through
/// `Unknown` so `can_extract` can echo the original string back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    ExtractionExternalSyncUnitsStart,
    ExtractionMetadataStart,
    ExtractionDataStart,
    ExtractionDataContinue,
    ExtractionDataDelete,
    ExtractionAttachmentsStart,
    ExtractionAttachmentsContinue,
    ExtractionAttachmentsDelete,
    Unknown(String),
}

impl EventType {
    /// Wire representation of the event type
    pub fn as_str(&self) -> &str {
        match self {
            Self::ExtractionExternalSyncUnitsStart => "EXTRACTION_EXTERNAL_SYNC_UNITS_START",
            Self::ExtractionMetadataStart => "EXTRACTION_METADATA_START",
            Self::ExtractionDataStart => "EXTRACTION_DATA_START",
            Self::ExtractionDataContinue => "EXTRACTION_DATA_CONTINUE",
            Self::ExtractionDataDelete => "EXTRACTION_DATA_DELETE",
            Self::ExtractionAttachmentsStart => "EXTRACTION_ATTACHMENTS_START",
            Self::ExtractionAttachmentsContinue => "EXTRACTION_ATTACHMENTS_CONTINUE",
            Self::ExtractionAttachmentsDelete => "EXTRACTION_ATTACHMENTS_DELETE",
            Self::Unknown(s) => s,
        }
    }

    /// Whether this event type belongs to the extraction allow-list
    pub fn is_extraction_event(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        match s {
            "EXTRACTION_EXTERNAL_SYNC_UNITS_START" => Self::ExtractionExternalSyncUnitsStart,
            "EXTRACTION_METADATA_START" => Self::ExtractionMetadataStart,
            "EXTRACTION_DATA_START" => Self::ExtractionDataStart,
            "EXTRACTION_DATA_CONTINUE" => Self::ExtractionDataContinue,
            "EXTRACTION_DATA_DELETE" => Self::ExtractionDataDelete,
            "EXTRACTION_ATTACHMENTS_START" => Self::ExtractionAttachmentsStart,
            "EXTRACTION_ATTACHMENTS_CONTINUE" => Self::ExtractionAttachmentsContinue,
            "EXTRACTION_ATTACHMENTS_DELETE" => Self::ExtractionAttachmentsDelete,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EventType::from(s.as_str()))
    }
}

// ============================================================================
// Extraction Mode
// ============================================================================

/// Sync mode carried in the event context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionMode {
    #[default]
    Initial,
    Incremental,
    Loading,
    #[serde(other)]
    Unknown,
}

// ============================================================================
// Event Envelope
// ============================================================================

/// The event envelope delivered to every snap-in function.
///
/// Constructed by the DevRev runtime, consumed read-only by handlers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirdropEvent {
    #[serde(default)]
    pub context: EventContextInfo,
    #[serde(default)]
    pub execution_metadata: ExecutionMetadata,
    #[serde(default)]
    pub payload: EventPayload,
    #[serde(default)]
    pub input_data: InputData,
}

/// Runtime context: secrets and snap-in identifiers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventContextInfo {
    #[serde(default)]
    pub secrets: Secrets,
    #[serde(default)]
    pub snap_in_id: Option<String>,
    #[serde(default)]
    pub snap_in_version_id: Option<String>,
}

/// Secrets provisioned by the platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub service_account_token: Option<String>,
}

/// Metadata about the current invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub devrev_endpoint: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
}

/// The event payload: what happened and against which connection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub event_type: Option<EventType>,
    #[serde(default)]
    pub connection_data: Option<ConnectionData>,
    #[serde(default)]
    pub event_context: Option<EventContext>,
    #[serde(default)]
    pub event_data: Option<EventData>,
}

/// Connection data for the Trello keyring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionData {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default)]
    pub key_type: Option<String>,
}

/// Per-sync-run context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventContext {
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub external_sync_unit_id: Option<String>,
    #[serde(default)]
    pub external_sync_unit_name: Option<String>,
    #[serde(default)]
    pub mode: Option<ExtractionMode>,
    #[serde(default)]
    pub dev_org: Option<String>,
    #[serde(default)]
    pub sync_unit_id: Option<String>,
    #[serde(default)]
    pub sync_run_id: Option<String>,
    #[serde(default)]
    pub worker_data_url: Option<String>,
}

/// Extra data attached to continuation events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default, rename = "lastSuccessfulSyncStarted")]
    pub last_successful_sync_started: Option<String>,
}

/// Free-form inputs configured on the snap-in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputData {
    #[serde(default)]
    pub global_values: HashMap<String, String>,
    #[serde(default)]
    pub event_sources: HashMap<String, String>,
}

// ============================================================================
// Presence-check helpers
// ============================================================================

impl AirdropEvent {
    /// The connection key string, validated for presence
    pub fn connection_key(&self) -> Result<&str> {
        let connection = self
            .payload
            .connection_data
            .as_ref()
            .ok_or_else(|| Error::missing_field("connection_data in payload"))?;
        connection
            .key
            .as_deref()
            .ok_or_else(|| Error::missing_field("key in connection_data"))
    }

    /// The Trello organization id, validated for presence
    pub fn org_id(&self) -> Result<&str> {
        let connection = self
            .payload
            .connection_data
            .as_ref()
            .ok_or_else(|| Error::missing_field("connection_data in payload"))?;
        connection
            .org_id
            .as_deref()
            .ok_or_else(|| Error::missing_field("org_id in connection_data"))
    }

    /// The event context, validated for presence
    pub fn event_context(&self) -> Result<&EventContext> {
        self.payload
            .event_context
            .as_ref()
            .ok_or_else(|| Error::missing_field("event_context in payload"))
    }

    /// The board id (external sync unit id), validated for presence
    pub fn board_id(&self) -> Result<&str> {
        self.event_context()?
            .external_sync_unit_id
            .as_deref()
            .ok_or_else(|| Error::missing_field("external_sync_unit_id in event_context"))
    }

    /// The callback URL, validated for presence
    pub fn callback_url(&self) -> Result<&str> {
        self.event_context()?
            .callback_url
            .as_deref()
            .ok_or_else(|| Error::missing_field("callback_url in event_context"))
    }

    /// The service account token, validated for presence
    pub fn service_account_token(&self) -> Result<&str> {
        self.context
            .secrets
            .service_account_token
            .as_deref()
            .ok_or_else(|| Error::missing_field("service_account_token in event context"))
    }

    /// The DevRev endpoint, validated for presence
    pub fn devrev_endpoint(&self) -> Result<&str> {
        self.execution_metadata
            .devrev_endpoint
            .as_deref()
            .ok_or_else(|| Error::missing_field("devrev_endpoint in execution metadata"))
    }

    /// Whether this run is an incremental sync
    pub fn is_incremental(&self) -> bool {
        self.payload
            .event_context
            .as_ref()
            .and_then(|ctx| ctx.mode)
            == Some(ExtractionMode::Incremental)
    }

    /// The incremental watermark from event data, if any
    pub fn last_successful_sync_started(&self) -> Option<&str> {
        self.payload
            .event_data
            .as_ref()
            .and_then(|d| d.last_successful_sync_started.as_deref())
    }
}
