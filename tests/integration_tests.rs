//! Integration tests for the snap-in HTTP contract
//!
//! Spin up the real server on an ephemeral port, POST events at
//! `/handle/sync` and assert on `{function_result}` / `{error}` bodies,
//! with wiremock standing in for the Trello API.

use serde_json::{json, Value};
use trello_airdrop::adapter::WorkerOptions;
use trello_airdrop::cli::{serve, ServerConfig};
use trello_airdrop::functions::FunctionContext;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start the snap-in server against a Trello mock, returning its base URL
async fn start_server(trello_base_url: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ServerConfig {
        context: FunctionContext {
            options: WorkerOptions {
                trello_base_url: trello_base_url.to_string(),
                ..WorkerOptions::default()
            },
            ..FunctionContext::default()
        },
    };
    tokio::spawn(async move {
        serve(config, port).await.unwrap();
    });

    // Wait for the listener to come up
    let base = format!("http://127.0.0.1:{port}");
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if client.get(format!("{base}/health")).send().await.is_ok() {
            return base;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("server did not start");
}

fn invocation(function_name: &str, payload: Value) -> Value {
    json!({
        "execution_metadata": {
            "function_name": function_name,
            "devrev_endpoint": "https://api.devrev.ai"
        },
        "context": { "secrets": { "service_account_token": "svc-token" } },
        "payload": payload,
        "input_data": { "global_values": {}, "event_sources": {} }
    })
}

async fn call(base: &str, body: &Value) -> Value {
    reqwest::Client::new()
        .post(format!("{base}/handle/sync"))
        .json(body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let trello = MockServer::start().await;
    let base = start_server(&trello.uri()).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_health_check_function() {
    let trello = MockServer::start().await;
    let base = start_server(&trello.uri()).await;

    let response = call(&base, &invocation("health_check", json!({}))).await;
    assert_eq!(response["function_result"]["success"], true);
    assert_eq!(
        response["function_result"]["function_name"],
        "health_check"
    );
}

#[tokio::test]
async fn test_unknown_function_is_an_error() {
    let trello = MockServer::start().await;
    let base = start_server(&trello.uri()).await;

    let response = call(&base, &invocation("does_not_exist", json!({}))).await;
    assert_eq!(
        response["error"]["message"],
        "Unknown function: does_not_exist"
    );
    assert!(response.get("function_result").is_none());
}

#[tokio::test]
async fn test_can_extract_rejects_non_extraction_event() {
    let trello = MockServer::start().await;
    let base = start_server(&trello.uri()).await;

    let response = call(
        &base,
        &invocation(
            "can_extract",
            json!({
                "event_type": "SOMETHING_ELSE",
                "event_context": { "callback_url": "http://localhost/cb" }
            }),
        ),
    )
    .await;

    let result = &response["function_result"];
    assert_eq!(result["can_extract"], false);
    assert_eq!(
        result["message"],
        "Event type SOMETHING_ELSE is not an extraction event"
    );
}

#[tokio::test]
async fn test_can_extract_accepts_every_allow_listed_event() {
    let trello = MockServer::start().await;
    let base = start_server(&trello.uri()).await;

    for event_type in [
        "EXTRACTION_EXTERNAL_SYNC_UNITS_START",
        "EXTRACTION_METADATA_START",
        "EXTRACTION_DATA_START",
        "EXTRACTION_DATA_CONTINUE",
        "EXTRACTION_DATA_DELETE",
        "EXTRACTION_ATTACHMENTS_START",
        "EXTRACTION_ATTACHMENTS_CONTINUE",
        "EXTRACTION_ATTACHMENTS_DELETE",
    ] {
        let response = call(
            &base,
            &invocation(
                "can_extract",
                json!({
                    "event_type": event_type,
                    "event_context": { "callback_url": "http://localhost/cb" }
                }),
            ),
        )
        .await;
        assert_eq!(
            response["function_result"]["can_extract"], true,
            "{event_type} should be extractable"
        );
    }
}

#[tokio::test]
async fn test_can_push_data_round_trip() {
    let trello = MockServer::start().await;
    let callback = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&callback)
        .await;

    let base = start_server(&trello.uri()).await;

    let response = call(
        &base,
        &invocation(
            "can_push_data",
            json!({
                "event_context": { "callback_url": format!("{}/callback", callback.uri()) }
            }),
        ),
    )
    .await;

    let result = &response["function_result"];
    assert_eq!(result["can_push"], true);
    assert_eq!(
        result["message"],
        "Successfully pushed data to callback URL. Status: 200"
    );
}

#[tokio::test]
async fn test_can_push_data_unreachable_callback() {
    let trello = MockServer::start().await;
    let base = start_server(&trello.uri()).await;

    let response = call(
        &base,
        &invocation(
            "can_push_data",
            json!({
                "event_context": { "callback_url": "http://127.0.0.1:1/callback" }
            }),
        ),
    )
    .await;

    let result = &response["function_result"];
    assert_eq!(result["can_push"], false);
    assert!(result["message"]
        .as_str()
        .unwrap()
        .contains("Error pushing data"));
}

#[tokio::test]
async fn test_check_auth_against_mock_trello() {
    let trello = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/members/me"))
        .and(query_param("key", "k"))
        .and(query_param("token", "t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m1", "username": "alice", "fullName": "Alice Smith"
        })))
        .mount(&trello)
        .await;

    let base = start_server(&trello.uri()).await;

    let response = call(
        &base,
        &invocation(
            "check_auth",
            json!({ "connection_data": { "key": "key=k&token=t" } }),
        ),
    )
    .await;

    let result = &response["function_result"];
    assert_eq!(result["status"], "success");
    assert_eq!(result["member_info"]["id"], "m1");
}

#[tokio::test]
async fn test_fetch_board_cards_pagination_is_disjoint() {
    let trello = MockServer::start().await;

    // First page: newest three of five cards
    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .and(query_param("limit", "3"))
        .and(query_param("before", "c5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c2", "name": "two" },
            { "id": "c1", "name": "one" }
        ])))
        .mount(&trello)
        .await;
    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c5", "name": "five" },
            { "id": "c4", "name": "four" },
            { "id": "c3", "name": "three" }
        ])))
        .mount(&trello)
        .await;

    let base = start_server(&trello.uri()).await;

    let payload = |before: Option<&str>| {
        let mut globals = json!({ "limit": "3" });
        if let Some(before) = before {
            globals["before"] = json!(before);
        }
        let mut event = invocation(
            "fetch_board_cards",
            json!({
                "connection_data": { "key": "key=k&token=t" },
                "event_context": { "external_sync_unit_id": "b1" }
            }),
        );
        event["input_data"]["global_values"] = globals;
        event
    };

    // min(limit, N) on the first page
    let first = call(&base, &payload(None)).await;
    let first_cards = first["function_result"]["cards"].as_array().unwrap().clone();
    assert_eq!(first_cards.len(), 3);

    // Second page keyed off the first card of the previous page
    let before = first_cards[0]["id"].as_str().unwrap().to_string();
    let second = call(&base, &payload(Some(&before))).await;
    let second_cards = second["function_result"]["cards"].as_array().unwrap().clone();
    assert_eq!(second_cards.len(), 2);

    let first_ids: Vec<_> = first_cards.iter().map(|c| c["id"].as_str().unwrap()).collect();
    for card in &second_cards {
        assert!(!first_ids.contains(&card["id"].as_str().unwrap()));
    }
}

#[tokio::test]
async fn test_metadata_function_shape() {
    let trello = MockServer::start().await;
    let base = start_server(&trello.uri()).await;

    let response = call(&base, &invocation("get_external_domain_metadata", json!({}))).await;
    let metadata = &response["function_result"]["metadata"];

    assert_eq!(metadata["schema_version"], "v0.2.0");
    let id_members = &metadata["record_types"]["cards"]["fields"]["id_members"];
    assert_eq!(id_members["type"], "reference");
    assert_eq!(id_members["collection"]["max_length"], 50);
    assert!(id_members["reference"]["refers_to"]
        .get("#record:users")
        .is_some());
}

#[tokio::test]
async fn test_initial_domain_mapping_function() {
    let trello = MockServer::start().await;
    let base = start_server(&trello.uri()).await;

    let response = call(&base, &invocation("get_initial_domain_mapping", json!({}))).await;
    let mapping = &response["function_result"]["mapping"];
    let cards = &mapping["additional_mappings"]["record_type_mappings"]["cards"];
    assert_eq!(cards["default_mapping"]["object_type"], "issue");
}
