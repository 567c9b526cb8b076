//! Health check function

use super::{first_event, now_iso};
use crate::error::Result;
use crate::types::AirdropEvent;
use serde_json::{json, Value};

/// Confirm the snap-in can be invoked at all
pub async fn handle(events: &[AirdropEvent]) -> Result<Value> {
    let event = first_event(events)?;

    Ok(json!({
        "success": true,
        "message": "Health check passed",
        "function_name": event.execution_metadata.function_name,
        "timestamp": now_iso(),
    }))
}
