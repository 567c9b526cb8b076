//! Authentication check function
//!
//! Verifies the Trello key/token pair by fetching `/members/me`.

use super::{first_event, now_iso, FunctionContext};
use crate::error::Result;
use crate::types::AirdropEvent;
use serde_json::{json, Value};

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

    match client.current_member().await {
        Ok(member) => Ok(json!({
            "status": "success",
            "status_code": 200,
            "api_delay": 0,
            "message": "Authentication successful - API key and token are valid",
            "timestamp": timestamp,
            "member_info": {
                "id": member.id,
                "username": member.username,
                "full_name": member.full_name,
            },
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::WorkerOptions;
    use serde_json::json as j;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx_for(server: &MockServer) -> FunctionContext {
        FunctionContext {
            options: WorkerOptions {
                trello_base_url: server.uri(),
                ..WorkerOptions::default()
            },
            ..FunctionContext::default()
        }
    }

    fn event_with_key(key: &str) -> AirdropEvent {
        serde_json::from_value(j!({
            "payload": { "connection_data": { "key": key } }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/members/me"))
            .and(query_param("key", "k"))
            .and(query_param("token", "t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(j!({
                "id": "m1", "username": "alice", "fullName": "Alice Smith"
            })))
            .mount(&server)
            .await;

        let result = handle(&[event_with_key("key=k&token=t")], &ctx_for(&server))
            .await
            .unwrap();
        assert_eq!(result["status"], "success");
        assert_eq!(
            result["message"],
            "Authentication successful - API key and token are valid"
        );
        assert_eq!(result["member_info"]["username"], "alice");
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/members/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = handle(&[event_with_key("key=k&token=bad")], &ctx_for(&server))
            .await
            .unwrap();
        assert_eq!(result["status"], "failure");
        assert_eq!(result["status_code"], 401);
        assert_eq!(
            result["message"],
            "Authentication failed - invalid API key or token"
        );
    }

    #[tokio::test]
    async fn test_malformed_key_string() {
        let server = MockServer::start().await;
        let result = handle(&[event_with_key("garbage")], &ctx_for(&server))
            .await
            .unwrap();
        assert_eq!(result["status"], "failure");
        assert_eq!(result["status_code"], 500);
        assert!(result["message"]
            .as_str()
            .unwrap()
            .contains("Invalid key format"));
    }
}
