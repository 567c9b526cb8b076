//! Tests for the Trello client

use super::*;
use crate::auth::Credentials;
use crate::error::Error;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> TrelloClient {
    TrelloClient::with_base_url(Credentials::new("k", "t"), server.uri())
}

fn card(id: &str) -> serde_json::Value {
    json!({ "id": id, "name": format!("card {id}"), "idMembers": [] })
}

#[tokio::test]
async fn test_fetch_boards() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/members/me/boards"))
        .and(query_param("key", "k"))
        .and(query_param("token", "t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "b1", "name": "Roadmap", "desc": "", "closed": false },
            { "id": "b2", "name": "Support", "desc": "tickets", "closed": true }
        ])))
        .mount(&server)
        .await;

    let boards = client_for(&server).fetch_boards().await.unwrap();
    assert_eq!(boards.len(), 2);
    assert_eq!(boards[0].name, "Roadmap");
    assert!(boards[1].closed);
}

#[tokio::test]
async fn test_fetch_cards_passes_limit_and_before() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .and(query_param("limit", "2"))
        .and(query_param("before", "c3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([card("c2"), card("c1")])))
        .mount(&server)
        .await;

    let cards = client_for(&server)
        .fetch_cards("b1", Some(2), Some("c3"))
        .await
        .unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].id, "c2");
}

#[tokio::test]
async fn test_fetch_card_count_paginates() {
    let server = MockServer::start().await;

    // First page: 100 ids, newest first
    let first_page: Vec<_> = (0..100).map(|i| card(&format!("c{}", 199 - i))).collect();
    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .and(query_param("fields", "id"))
        .and(query_param("limit", "100"))
        .and(query_param("before", "c199"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([card("c99")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/boards/b1/cards"))
        .and(query_param("fields", "id"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first_page))
        .mount(&server)
        .await;

    let count = client_for(&server).fetch_card_count("b1").await.unwrap();
    assert_eq!(count, 101);
}

#[tokio::test]
async fn test_auth_failure_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/members/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let err = client_for(&server).current_member().await.unwrap_err();
    assert_eq!(err.status_code(), Some(401));
    assert!(err
        .to_string()
        .contains("Authentication failed - invalid API key or token"));
}

#[tokio::test]
async fn test_rate_limit_surfaces_api_delay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/organizations/org1/members"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let client = TrelloClient::with_base_url(Credentials::new("k", "t"), server.uri());
    let err = client
        .fetch_organization_members("org1")
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(429));
    assert_eq!(err.api_delay(), 7);
    assert!(err.to_string().contains("Rate limit exceeded"));
}

#[tokio::test]
async fn test_server_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/c1/attachments"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_card_attachments("c1")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Trello API server error"));
}

#[tokio::test]
async fn test_create_action_yields_creator() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/c1/actions"))
        .and(query_param("filter", "createCard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a1", "idMemberCreator": "m7", "type": "createCard" }
        ])))
        .mount(&server)
        .await;

    let actions = client_for(&server)
        .fetch_card_create_action("c1")
        .await
        .unwrap();
    assert_eq!(actions[0].id_member_creator.as_deref(), Some("m7"));
}

#[tokio::test]
async fn test_invalid_connection_data() {
    let err = TrelloClient::from_connection_data("not-a-key-string").unwrap_err();
    assert!(matches!(err, Error::InvalidKeyFormat));
}
