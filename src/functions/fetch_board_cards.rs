//! `fetch_board_cards` function
//!
//! Returns one page of a board's cards, validating the envelope and the
//! `limit`/`before` paging inputs before touching the API.

use super::{first_event, now_iso, FunctionContext};
use crate::error::{Error, Result};
use crate::trello::Card;
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

fn validate(event: &AirdropEvent) -> Result<(String, u32, Option<String>)> {
    event.connection_key()?;
    let board_id = event.board_id()?.to_string();

    let limit = event
        .input_data
        .global_values
        .get("limit")
        .ok_or_else(|| Error::missing_field("limit in global_values"))?;
    let limit: u32 = limit
        .parse()
        .ok()
        .filter(|l| *l > 0)
        .ok_or_else(|| Error::invalid_event("limit must be a positive integer"))?;

    let before = event.input_data.global_values.get("before").cloned();
    Ok((board_id, limit, before))
}

/// Reshape a card for the response, snake-casing the activity field
fn card_json(card: &Card) -> Value {
    json!({
        "id": card.id,
        "name": card.name,
        "desc": card.desc,
        "closed": card.closed,
        "date_last_activity": card.date_last_activity,
        "id_list": card.id_list,
        "id_board": card.id_board,
        "url": card.url,
        "short_url": card.short_url,
        "due": card.due,
        "due_complete": card.due_complete,
        "labels": card.labels,
        "id_members": card.id_members,
    })
}

pub async fn handle(events: &[AirdropEvent], ctx: &FunctionContext) -> Result<Value> {
    let event = first_event(events)?;

    let (board_id, limit, before) = match validate(event) {
        Ok(parsed) => parsed,
        Err(e) => return Ok(failure(500, 0, e.to_string())),
    };

    let client = match ctx.trello_client(event) {
        Ok(client) => client,
        Err(e) => return Ok(failure(500, 0, e.to_string())),
    };

    match client
        .fetch_cards(&board_id, Some(limit), before.as_deref())
        .await
    {
        Ok(cards) => Ok(json!({
            "status": "success",
            "status_code": 200,
            "api_delay": 0,
            "message": "Successfully retrieved board cards",
            "timestamp": now_iso(),
            "cards": cards.iter().map(card_json).collect::<Vec<_>>(),
        })),
        Err(e) => Ok(failure(
            e.status_code().unwrap_or(500),
            e.api_delay(),
            e.to_string(),
        )),
    }
}
