//! `can_extract` validation function
//!
//! Checks that the event is an extraction event and that the context
//! carries everything an extraction run needs. The empty event slice is
//! the single case that fails the invocation instead of answering.

use super::first_event;
use crate::error::Result;
use crate::types::AirdropEvent;
use serde_json::{json, Value};

fn no(message: impl Into<String>) -> Value {
    json!({ "can_extract": false, "message": message.into() })
}

pub async fn handle(events: &[AirdropEvent]) -> Result<Value> {
    let event = first_event(events)?;

    let Some(event_type) = &event.payload.event_type else {
        return Ok(no("Missing event type in payload"));
    };

    if !event_type.is_extraction_event() {
        return Ok(no(format!(
            "Event type {event_type} is not an extraction event"
        )));
    }

    if event.service_account_token().is_err() {
        return Ok(no("Missing service account token in event context"));
    }

    if event.devrev_endpoint().is_err() {
        return Ok(no("Missing DevRev endpoint in execution metadata"));
    }

    if event.event_context().is_err() {
        return Ok(no("Missing event context in payload"));
    }

    Ok(json!({
        "can_extract": true,
        "message": "Data extraction workflow can be invoked"
    }))
}
