//! Extraction router
//!
//! Routes `EXTRACTION_*` events to the matching worker and runs it
//! under its deadline. The worker owns error reporting through the
//! callback; the function result only says whether a run happened.

use super::{first_event, FunctionContext};
use crate::adapter::{run_worker, ExtractionWorker, WorkerAdapter};
use crate::error::Result;
use crate::types::{AirdropEvent, EventType};
use crate::workers::{AttachmentsWorker, DataWorker, MetadataWorker, SyncUnitsWorker};
use serde_json::{json, Value};

pub async fn handle(events: &[AirdropEvent], ctx: &FunctionContext) -> Result<Value> {
    let event = first_event(events)?;

    let Some(event_type) = event.payload.event_type.clone() else {
        return Ok(json!({
            "success": false,
            "message": "Missing event type in payload"
        }));
    };

    match event_type {
        EventType::ExtractionExternalSyncUnitsStart => {
            run(&SyncUnitsWorker, event, ctx, "External sync units extraction completed").await
        }
        EventType::ExtractionMetadataStart => {
            run(&MetadataWorker, event, ctx, "Metadata extraction completed").await
        }
        EventType::ExtractionDataStart | EventType::ExtractionDataContinue => {
            run(&DataWorker, event, ctx, "Data extraction completed successfully").await
        }
        EventType::ExtractionAttachmentsStart | EventType::ExtractionAttachmentsContinue => {
            run(&AttachmentsWorker, event, ctx, "Attachments extraction completed").await
        }
        other => Ok(json!({
            "success": false,
            "message": format!("Unsupported event type: {other}")
        })),
    }
}

async fn run<W: ExtractionWorker>(
    worker: &W,
    event: &AirdropEvent,
    ctx: &FunctionContext,
    success_message: &str,
) -> Result<Value> {
    let state = match ctx.state_manager() {
        Ok(state) => state,
        Err(e) => {
            return Ok(json!({
                "success": false,
                "message": format!("Error in extraction function: {e}")
            }))
        }
    };

    let mut adapter = match WorkerAdapter::new(event.clone(), state.clone(), ctx.options.clone()) {
        Ok(adapter) => adapter,
        Err(e) => {
            return Ok(json!({
                "success": false,
                "message": format!("Error in extraction function: {e}")
            }))
        }
    };

    let result = run_worker(worker, &mut adapter).await;

    // Persist whatever the run left behind (no-op in memory mode)
    if let Err(e) = state.save().await {
        tracing::warn!("Failed to persist extraction state: {e}");
    }

    match result {
        Ok(()) => Ok(json!({ "success": true, "message": success_message })),
        Err(e) => Ok(json!({
            "success": false,
            "message": format!("Error in extraction function: {e}")
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json as j;

    #[tokio::test]
    async fn test_unsupported_event_type() {
        let event: AirdropEvent = serde_json::from_value(j!({
            "payload": {
                "event_type": "EXTRACTION_DATA_DELETE",
                "event_context": { "callback_url": "http://localhost/cb" }
            }
        }))
        .unwrap();

        let result = handle(&[event], &FunctionContext::default()).await.unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(
            result["message"],
            "Unsupported event type: EXTRACTION_DATA_DELETE"
        );
    }

    #[tokio::test]
    async fn test_missing_event_type() {
        let event = AirdropEvent::default();
        let result = handle(&[event], &FunctionContext::default()).await.unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["message"], "Missing event type in payload");
    }

    #[tokio::test]
    async fn test_missing_callback_url_reported() {
        let event: AirdropEvent = serde_json::from_value(j!({
            "payload": { "event_type": "EXTRACTION_METADATA_START", "event_context": {} }
        }))
        .unwrap();

        let result = handle(&[event], &FunctionContext::default()).await.unwrap();
        assert_eq!(result["success"], false);
        assert!(result["message"]
            .as_str()
            .unwrap()
            .contains("missing callback_url"));
    }
}
