//! `fetch_organization_members` function

use super::{first_event, now_iso, FunctionContext};
use crate::error::Result;
use crate::trello::Member;
use crate::types::AirdropEvent;
use serde_json::{json, Value};

fn failure(status_code: u16, api_delay: u64, message: impl Into<String>) -> Value {
    json!({
        "status": "failure",
        "status_code": status_code,
        "api_delay": api_delay,
        "message": message.into(),
        "timestamp": now_iso(),
    })
}

fn member_json(member: &Member) -> Value {
    json!({
        "id": member.id,
        "username": member.username,
        "full_name": member.full_name,
        "last_active": member.last_active,
    })
}

pub async fn handle(events: &[AirdropEvent], ctx: &FunctionContext) -> Result<Value> {
    let event = first_event(events)?;

    let org_id = match event.org_id() {
        Ok(org_id) => org_id.to_string(),
        Err(e) => return Ok(failure(500, 0, e.to_string())),
    };
    let client = match ctx.trello_client(event) {
        Ok(client) => client,
        Err(e) => return Ok(failure(500, 0, e.to_string())),
    };

    match client.fetch_organization_members(&org_id).await {
        Ok(members) => Ok(json!({
            "status": "success",
            "status_code": 200,
            "api_delay": 0,
            "message": "Successfully fetched organization members",
            "timestamp": now_iso(),
            "members": members.iter().map(member_json).collect::<Vec<_>>(),
        })),
        Err(e) => Ok(failure(
            e.status_code().unwrap_or(500),
            e.api_delay(),
            e.to_string(),
        )),
    }
}
