//! Domain metadata and initial mapping functions
//!
//! Both return generated documents; the event only gates invocation.

use super::first_event;
use crate::error::Result;
use crate::metadata::{external_domain_metadata, initial_domain_mapping};
use crate::types::AirdropEvent;
use serde_json::{json, Value};

/// `get_external_domain_metadata`
pub async fn handle_metadata(events: &[AirdropEvent]) -> Result<Value> {
    first_event(events)?;

    Ok(json!({
        "status": "success",
        "message": "Successfully generated external domain metadata",
        "metadata": external_domain_metadata(),
    }))
}

/// `get_initial_domain_mapping`
pub async fn handle_mapping(events: &[AirdropEvent]) -> Result<Value> {
    first_event(events)?;

    Ok(json!({
        "status": "success",
        "message": "Successfully generated initial domain mapping",
        "mapping": initial_domain_mapping(),
    }))
}
