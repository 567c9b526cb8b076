//! `fetch_boards` function

use super::{first_event, now_iso, FunctionContext};
use crate::error::Result;
use crate::trello::Board;
use crate::types::AirdropEvent;
use serde_json::{json, Value};

fn board_json(board: &Board) -> Value {
    json!({
        "id": board.id,
        "name": board.name,
        "desc": board.desc,
        "closed": board.closed,
        "url": board.url,
        "short_url": board.short_url,
        "id_organization": board.id_organization,
    })
}

pub async fn handle(events: &[AirdropEvent], ctx: &FunctionContext) -> Result<Value> {
    let event = first_event(events)?;
    let timestamp = now_iso();

    let client = match ctx.trello_client(event) {
        Ok(client) => client,
        Err(e) => {
            return Ok(json!({
                "status": "failure",
                "status_code": 500,
                "api_delay": 0,
                "message": e.to_string(),
                "timestamp": timestamp,
            }))
        }
    };

    match client.fetch_boards().await {
        Ok(boards) => Ok(json!({
            "status": "success",
            "status_code": 200,
            "api_delay": 0,
            "message": "Successfully fetched boards",
            "timestamp": timestamp,
            "boards": boards.iter().map(board_json).collect::<Vec<_>>(),
        })),
        Err(e) => Ok(json!({
            "status": "failure",
            "status_code": e.status_code().unwrap_or(500),
            "api_delay": e.api_delay(),
            "message": e.to_string(),
            "timestamp": timestamp,
        })),
    }
}
