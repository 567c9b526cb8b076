//! Trello REST API client
//!
//! A thin typed wrapper over [`HttpClient`] for the handful of endpoints
//! the snap-in needs. Authentication rides along as `key`/`token` query
//! parameters on every request. Failures are classified into the
//! status / no-response / request-setup taxonomy, with the 401/403/429/5xx
//! cases mapped to the messages users actually see.

use super::models::{Action, Attachment, Board, Card, Member};
use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::pagination::BeforeCursor;
use tracing::debug;

/// Default Trello API base URL
pub const TRELLO_API_BASE: &str = "https://api.trello.com/1";

/// Page size used for card-count pagination
const COUNT_PAGE_LIMIT: u32 = 100;

/// Typed client for the Trello REST API
#[derive(Debug)]
pub struct TrelloClient {
    http: HttpClient,
    credentials: Credentials,
}

impl TrelloClient {
    /// Create a client against the production Trello API
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, TRELLO_API_BASE)
    }

    /// Create a client against a custom base URL (used by tests)
    ///
    /// No local retries: rate-limit and transient failures surface
    /// immediately with their `api_delay`, and the worker layer decides
    /// whether to emit a delay event.
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Self {
        let config = HttpClientConfig::builder()
            .base_url(base_url)
            .max_retries(0)
            .header("Accept", "application/json")
            .build();
        Self {
            http: HttpClient::with_config(config),
            credentials,
        }
    }

    /// Create a client from a raw connection-data key string
    pub fn from_connection_data(key_string: &str) -> Result<Self> {
        Ok(Self::new(Credentials::parse(key_string)?))
    }

    /// Create a client from a raw key string against a custom base URL
    pub fn from_connection_data_with_base_url(
        key_string: &str,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::with_base_url(Credentials::parse(key_string)?, base_url))
    }

    fn authed(&self) -> RequestConfig {
        let mut config = RequestConfig::new();
        for (key, value) in self.credentials.query_params() {
            config = config.query(key, value);
        }
        config
    }

    /// Fetch all boards visible to the authenticated member
    pub async fn fetch_boards(&self) -> Result<Vec<Board>> {
        let config = self
            .authed()
            .query("fields", "name,desc,url,closed,idOrganization,shortUrl");
        self.http
            .get_json("/members/me/boards", config)
            .await
            .map_err(|e| classify(e, "fetching boards"))
    }

    /// Fetch a page of cards for a board.
    ///
    /// `limit` caps the page size; `before` is the id of the newest card
    /// to exclude, so passing the first id of the previous page walks the
    /// board backwards one disjoint page at a time.
    pub async fn fetch_cards(
        &self,
        board_id: &str,
        limit: Option<u32>,
        before: Option<&str>,
    ) -> Result<Vec<Card>> {
        let mut config = self.authed().query("attachments", "true").query(
            "fields",
            "name,desc,closed,idList,idBoard,url,shortUrl,due,dueComplete,dateLastActivity,labels,idMembers",
        );
        if let Some(limit) = limit {
            config = config.query("limit", limit.to_string());
        }
        if let Some(before) = before {
            config = config.query("before", before);
        }
        self.http
            .get_json(&format!("/boards/{board_id}/cards"), config)
            .await
            .map_err(|e| classify(e, "fetching cards"))
    }

    /// Count cards on a board by paging through id-only card fetches
    pub async fn fetch_card_count(&self, board_id: &str) -> Result<usize> {
        let mut cursor = BeforeCursor::new(COUNT_PAGE_LIMIT);
        let mut count = 0usize;

        while !cursor.is_done() {
            let mut config = self.authed().query("fields", "id").query(
                "limit",
                cursor.limit().to_string(),
            );
            if let Some(before) = cursor.before() {
                config = config.query("before", before);
            }

            let page: Vec<Card> = self
                .http
                .get_json(&format!("/boards/{board_id}/cards"), config)
                .await
                .map_err(|e| classify(e, "counting cards"))?;

            count += page.len();
            cursor.advance(page.first().map(|c| c.id.as_str()), page.len());
        }

        debug!("Counted {} cards on board {}", count, board_id);
        Ok(count)
    }

    /// Fetch all members of an organization
    pub async fn fetch_organization_members(&self, org_id: &str) -> Result<Vec<Member>> {
        let config = self.authed().query("fields", "fullName,username,lastActive");
        self.http
            .get_json(&format!("/organizations/{org_id}/members"), config)
            .await
            .map_err(|e| classify(e, "fetching organization members"))
    }

    /// Fetch the attachments on a card
    pub async fn fetch_card_attachments(&self, card_id: &str) -> Result<Vec<Attachment>> {
        self.http
            .get_json(&format!("/cards/{card_id}/attachments"), self.authed())
            .await
            .map_err(|e| classify(e, "fetching card attachments"))
    }

    /// Fetch the createCard action for a card (yields the creator id)
    pub async fn fetch_card_create_action(&self, card_id: &str) -> Result<Vec<Action>> {
        let config = self.authed().query("filter", "createCard");
        self.http
            .get_json(&format!("/cards/{card_id}/actions"), config)
            .await
            .map_err(|e| classify(e, "fetching card create action"))
    }

    /// Fetch the authenticated member (auth probe)
    pub async fn current_member(&self) -> Result<Member> {
        self.http
            .get_json("/members/me", self.authed())
            .await
            .map_err(|e| classify(e, "checking authentication"))
    }

    /// Download an attachment body from its URL
    pub async fn download_attachment(&self, url: &str) -> Result<bytes::Bytes> {
        let config = RequestConfig::new().header("Accept-Encoding", "identity");
        let response = self
            .http
            .get_with_config(url, config)
            .await
            .map_err(|e| classify(e, "downloading attachment"))?;
        response
            .bytes()
            .await
            .map_err(|e| Error::no_response(format!("Failed to read attachment body: {e}")))
    }
}

/// Map transport-level errors to the messages surfaced to users.
///
/// Keeps the variant (so `status_code`/`api_delay`/`is_retryable` still
/// work) while rewriting the human-readable part.
fn classify(err: Error, context: &str) -> Error {
    match err {
        Error::HttpStatus {
            status,
            api_delay,
            message,
        } => {
            let message = match status {
                401 => "Authentication failed - invalid API key or token".to_string(),
                403 => "Access forbidden - insufficient permissions".to_string(),
                s if s >= 500 => "Trello API server error".to_string(),
                _ if message.is_empty() => {
                    format!("Failed while {context} with status {status}")
                }
                _ => message,
            };
            Error::HttpStatus {
                status,
                api_delay,
                message,
            }
        }
        Error::RateLimited {
            retry_after_seconds,
        } => Error::HttpStatus {
            status: 429,
            api_delay: retry_after_seconds,
            message: format!("Rate limit exceeded - retry after {retry_after_seconds} seconds"),
        },
        Error::Timeout { .. } | Error::NoResponse { .. } | Error::MaxRetriesExceeded { .. } => {
            Error::no_response(format!(
                "No response received from Trello API while {context}"
            ))
        }
        Error::RequestSetup { message } => {
            Error::request_setup(format!("Failed while {context}: {message}"))
        }
        other => other,
    }
}
