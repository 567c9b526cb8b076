//! Extractor events and callback emission
//!
//! A worker run terminates in exactly one of a small set of events
//! (`*_DONE`, `*_ERROR`, `*_DELAY`), POSTed as JSON to the callback URL
//! from the event context.

use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::repo::Artifact;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Terminal and progress event types emitted by extraction workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractorEventType {
    ExtractionExternalSyncUnitsDone,
    ExtractionExternalSyncUnitsError,
    ExtractionMetadataDone,
    ExtractionMetadataError,
    ExtractionDataProgress,
    ExtractionDataDelay,
    ExtractionDataDone,
    ExtractionDataError,
    ExtractionAttachmentsProgress,
    ExtractionAttachmentsDelay,
    ExtractionAttachmentsDone,
    ExtractionAttachmentsError,
}

/// A Trello board presented as an external sync unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSyncUnit {
    pub id: String,
    pub name: String,
    pub description: String,
    pub item_type: String,
    /// Card count for the board; `-1` signals the count fetch failed
    pub item_count: i64,
}

/// Error payload carried by `*_ERROR` events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
}

/// Payload attached to an extractor event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractorEventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_sync_units: Option<Vec<ExternalSyncUnit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<Artifact>>,
}

/// One emitted extractor event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorEvent {
    pub event_type: ExtractorEventType,
    #[serde(default)]
    pub event_data: ExtractorEventData,
}

impl ExtractorEvent {
    /// A bare event with an empty payload
    pub fn new(event_type: ExtractorEventType) -> Self {
        Self {
            event_type,
            event_data: ExtractorEventData::default(),
        }
    }

    /// An error event with a message
    pub fn error(event_type: ExtractorEventType, message: impl Into<String>) -> Self {
        Self {
            event_type,
            event_data: ExtractorEventData {
                error: Some(ErrorInfo {
                    message: message.into(),
                }),
                ..ExtractorEventData::default()
            },
        }
    }

    /// A delay event carrying the seconds to back off
    pub fn delay(event_type: ExtractorEventType, delay: u64) -> Self {
        Self {
            event_type,
            event_data: ExtractorEventData {
                delay: Some(delay),
                ..ExtractorEventData::default()
            },
        }
    }

    /// Attach external sync units to the payload
    #[must_use]
    pub fn with_sync_units(mut self, units: Vec<ExternalSyncUnit>) -> Self {
        self.event_data.external_sync_units = Some(units);
        self
    }

    /// Attach artifact summaries to the payload
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.event_data.artifacts = Some(artifacts);
        self
    }
}

/// Client that delivers extractor events to the callback URL
#[derive(Debug)]
pub struct CallbackClient {
    http: HttpClient,
    callback_url: String,
    token: Option<String>,
}

impl CallbackClient {
    /// Create a callback client for a URL, authenticated with the
    /// service account token when available
    pub fn new(callback_url: impl Into<String>, token: Option<String>) -> Self {
        let config = HttpClientConfig::builder().no_rate_limit().build();
        Self {
            http: HttpClient::with_config(config),
            callback_url: callback_url.into(),
            token,
        }
    }

    /// The URL events are delivered to
    pub fn url(&self) -> &str {
        &self.callback_url
    }

    /// POST one event to the callback URL
    pub async fn emit(&self, event: &ExtractorEvent) -> Result<()> {
        let body = serde_json::to_value(event)?;
        let mut config = RequestConfig::new().json(body);
        config = config.header("Content-Type", "application/json");
        if let Some(token) = &self.token {
            config = config.header("Authorization", token.clone());
        }

        info!(event_type = ?event.event_type, url = %self.callback_url, "Emitting extractor event");

        self.http
            .post_with_config(&self.callback_url, config)
            .await
            .map_err(|e| Error::callback(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_event_type_wire_names() {
        let json = serde_json::to_string(&ExtractorEventType::ExtractionDataDone).unwrap();
        assert_eq!(json, "\"EXTRACTION_DATA_DONE\"");

        let json =
            serde_json::to_string(&ExtractorEventType::ExtractionExternalSyncUnitsError).unwrap();
        assert_eq!(json, "\"EXTRACTION_EXTERNAL_SYNC_UNITS_ERROR\"");
    }

    #[test]
    fn test_event_payload_shape() {
        let event = ExtractorEvent::error(
            ExtractorEventType::ExtractionDataError,
            "Organization ID not found in connection data",
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "EXTRACTION_DATA_ERROR");
        assert_eq!(
            json["event_data"]["error"]["message"],
            "Organization ID not found in connection data"
        );
        // Unset payload fields stay off the wire
        assert!(json["event_data"].get("delay").is_none());
    }

    #[test]
    fn test_delay_event() {
        let event = ExtractorEvent::delay(ExtractorEventType::ExtractionAttachmentsDelay, 30);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_data"]["delay"], 30);
    }

    #[tokio::test]
    async fn test_emit_posts_event_with_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/callback"))
            .and(header("Authorization", "svc-token"))
            .and(body_partial_json(serde_json::json!({
                "event_type": "EXTRACTION_METADATA_DONE"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = CallbackClient::new(
            format!("{}/callback", server.uri()),
            Some("svc-token".to_string()),
        );
        client
            .emit(&ExtractorEvent::new(ExtractorEventType::ExtractionMetadataDone))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_emit_unreachable_callback() {
        let client = CallbackClient::new("http://127.0.0.1:1/callback", None);
        let err = client
            .emit(&ExtractorEvent::new(ExtractorEventType::ExtractionDataDone))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CallbackEmit { .. }));
    }
}
