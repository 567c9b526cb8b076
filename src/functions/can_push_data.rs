//! `can_push_data` validation function
//!
//! Probes the callback URL with a small test payload and reports
//! whether the sync pipeline can receive data from this snap-in.

use super::{first_event, now_iso};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::types::AirdropEvent;
use serde_json::{json, Value};

fn no(message: impl Into<String>) -> Value {
    json!({ "can_push": false, "message": message.into() })
}

pub async fn handle(events: &[AirdropEvent]) -> Result<Value> {
    let event = first_event(events)?;

    let Some(context) = &event.payload.event_context else {
        return Ok(no("Missing event context in payload"));
    };
    let Some(callback_url) = context.callback_url.as_deref() else {
        return Ok(no("Missing callback URL in event context"));
    };

    let config = HttpClientConfig::builder()
        .max_retries(0)
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config);

    let mut request = RequestConfig::new()
        .header("Content-Type", "application/json")
        .json(json!({
            "test_data": "This is a test payload",
            "timestamp": now_iso(),
        }));
    if let Ok(token) = event.service_account_token() {
        request = request.header("Authorization", token);
    }

    match client.post_with_config(callback_url, request).await {
        Ok(response) => Ok(json!({
            "can_push": true,
            "message": format!(
                "Successfully pushed data to callback URL. Status: {}",
                response.status().as_u16()
            )
        })),
        Err(e) => match e.status_code() {
            Some(status) => Ok(no(format!(
                "Failed to push data to callback URL. Status: {status}"
            ))),
            None => Ok(no(format!("Error pushing data to callback URL: {e}"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json as j;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event_with_callback(url: Option<&str>) -> AirdropEvent {
        let mut payload = j!({ "event_context": {} });
        if let Some(url) = url {
            payload = j!({ "event_context": { "callback_url": url } });
        }
        serde_json::from_value(j!({
            "context": { "secrets": { "service_account_token": "tok" } },
            "payload": payload
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_push_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cb"))
            .and(body_partial_json(j!({"test_data": "This is a test payload"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let event = event_with_callback(Some(&format!("{}/cb", server.uri())));
        let result = handle(&[event]).await.unwrap();
        assert_eq!(result["can_push"], true);
        assert_eq!(
            result["message"],
            "Successfully pushed data to callback URL. Status: 200"
        );
    }

    #[tokio::test]
    async fn test_push_fails_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cb"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let event = event_with_callback(Some(&format!("{}/cb", server.uri())));
        let result = handle(&[event]).await.unwrap();
        assert_eq!(result["can_push"], false);
        assert_eq!(
            result["message"],
            "Failed to push data to callback URL. Status: 400"
        );
    }

    #[tokio::test]
    async fn test_push_fails_on_unreachable_url() {
        let event = event_with_callback(Some("http://127.0.0.1:1/cb"));
        let result = handle(&[event]).await.unwrap();
        assert_eq!(result["can_push"], false);
        assert!(result["message"]
            .as_str()
            .unwrap()
            .starts_with("Error pushing data to callback URL:"));
    }

    #[tokio::test]
    async fn test_missing_callback_url() {
        let result = handle(&[event_with_callback(None)]).await.unwrap();
        assert_eq!(result["can_push"], false);
        assert_eq!(result["message"], "Missing callback URL in event context");
    }

    #[tokio::test]
    async fn test_missing_event_context() {
        let event: AirdropEvent = serde_json::from_value(j!({ "payload": {} })).unwrap();
        let result = handle(&[event]).await.unwrap();
        assert_eq!(result["message"], "Missing event context in payload");
    }

    #[tokio::test]
    async fn test_no_events_is_an_error() {
        assert!(matches!(handle(&[]).await.unwrap_err(), Error::NoEvents));
    }
}
