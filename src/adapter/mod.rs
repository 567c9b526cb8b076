//! Worker adapter and task runner
//!
//! The adapter is what an extraction worker programs against: the
//! incoming event, the run-scoped state, the item repositories and the
//! callback emitter. `run_worker` drives a worker to completion under a
//! deadline; when the deadline elapses the worker's timeout hook runs
//! instead, mirroring the `processTask`/`onTimeout` contract.

use crate::error::Result;
use crate::events::{CallbackClient, ExtractorEvent, ExtractorEventType};
use crate::repo::{Repo, RepoSet, DEFAULT_BATCH_SIZE};
use crate::state::StateManager;
use crate::trello::{TrelloClient, TRELLO_API_BASE};
use crate::types::AirdropEvent;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info};

/// Options governing a worker run
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Wall-clock budget for the task before the timeout hook fires
    pub timeout: Duration,
    /// Items per artifact batch
    pub batch_size: usize,
    /// Trello API base URL (overridden in tests)
    pub trello_base_url: String,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10 * 60),
            batch_size: DEFAULT_BATCH_SIZE,
            trello_base_url: TRELLO_API_BASE.to_string(),
        }
    }
}

/// Per-run adapter handed to extraction workers
#[derive(Debug)]
pub struct WorkerAdapter {
    event: AirdropEvent,
    state: StateManager,
    repos: RepoSet,
    callback: CallbackClient,
    options: WorkerOptions,
    emitted: Vec<ExtractorEventType>,
}

impl WorkerAdapter {
    /// Build an adapter for an event.
    ///
    /// Fails when the event carries no usable callback URL — without one
    /// there is nowhere to deliver the terminal event.
    pub fn new(event: AirdropEvent, state: StateManager, options: WorkerOptions) -> Result<Self> {
        let callback_url = url::Url::parse(event.callback_url()?)?.to_string();
        let token = event
            .service_account_token()
            .ok()
            .map(std::string::ToString::to_string);

        Ok(Self {
            event,
            state,
            repos: RepoSet::new(),
            callback: CallbackClient::new(callback_url, token),
            options,
            emitted: Vec::new(),
        })
    }

    /// The event this run was invoked with
    pub fn event(&self) -> &AirdropEvent {
        &self.event
    }

    /// The run-scoped state
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Run options
    pub fn options(&self) -> &WorkerOptions {
        &self.options
    }

    /// Build a Trello client from the event's connection data
    pub fn trello_client(&self) -> Result<TrelloClient> {
        TrelloClient::from_connection_data_with_base_url(
            self.event.connection_key()?,
            self.options.trello_base_url.clone(),
        )
    }

    /// Initialize repositories for the given item types
    pub fn initialize_repos(&mut self, item_types: &[&str]) {
        self.repos
            .initialize_with_batch_size(item_types, self.options.batch_size);
    }

    /// Get a repository by item type
    pub fn repo(&mut self, item_type: &str) -> Option<&mut Repo> {
        self.repos.get(item_type)
    }

    /// The repo set, for artifact summaries
    pub fn repos(&self) -> &RepoSet {
        &self.repos
    }

    /// Deliver an event to the callback URL
    pub async fn emit(&mut self, event: ExtractorEvent) -> Result<()> {
        self.emitted.push(event.event_type);
        self.callback.emit(&event).await
    }

    /// Event types emitted so far in this run
    pub fn emitted(&self) -> &[ExtractorEventType] {
        &self.emitted
    }
}

/// An extraction worker: one task body plus a timeout hook
#[async_trait]
pub trait ExtractionWorker: Send + Sync {
    /// Human-readable worker name for logs
    fn name(&self) -> &'static str;

    /// The task body; errors are the worker's to catch and emit
    async fn run(&self, adapter: &mut WorkerAdapter) -> Result<()>;

    /// Invoked instead of completion when the deadline elapses
    async fn on_timeout(&self, adapter: &mut WorkerAdapter) -> Result<()>;
}

/// Drive a worker under its deadline.
///
/// The task future is dropped when the deadline elapses; the timeout
/// hook then owns the adapter and emits the terminal event.
pub async fn run_worker<W: ExtractionWorker>(
    worker: &W,
    adapter: &mut WorkerAdapter,
) -> Result<()> {
    let timeout = adapter.options().timeout;
    info!(worker = worker.name(), ?timeout, "Starting extraction worker");

    match tokio::time::timeout(timeout, worker.run(adapter)).await {
        Ok(result) => result,
        Err(_elapsed) => {
            error!(worker = worker.name(), "Extraction worker timed out");
            worker.on_timeout(adapter).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ExtractorEvent;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event_with_callback(url: &str) -> AirdropEvent {
        serde_json::from_value(json!({
            "payload": {
                "connection_data": { "key": "key=k&token=t", "org_id": "org1" },
                "event_context": { "callback_url": url, "external_sync_unit_id": "b1" }
            },
            "context": { "secrets": { "service_account_token": "tok" } }
        }))
        .unwrap()
    }

    struct SleepyWorker;

    #[async_trait]
    impl ExtractionWorker for SleepyWorker {
        fn name(&self) -> &'static str {
            "sleepy"
        }

        async fn run(&self, _adapter: &mut WorkerAdapter) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }

        async fn on_timeout(&self, adapter: &mut WorkerAdapter) -> Result<()> {
            adapter
                .emit(ExtractorEvent::error(
                    ExtractorEventType::ExtractionDataError,
                    "Lambda timeout",
                ))
                .await
        }
    }

    #[tokio::test]
    async fn test_missing_callback_url_rejected() {
        let event: AirdropEvent = serde_json::from_value(json!({
            "payload": { "event_context": {} }
        }))
        .unwrap();
        let result = WorkerAdapter::new(event, StateManager::in_memory(), WorkerOptions::default());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_timeout_invokes_hook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cb"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let options = WorkerOptions {
            timeout: Duration::from_millis(50),
            ..WorkerOptions::default()
        };
        let mut adapter = WorkerAdapter::new(
            event_with_callback(&format!("{}/cb", server.uri())),
            StateManager::in_memory(),
            options,
        )
        .unwrap();

        run_worker(&SleepyWorker, &mut adapter).await.unwrap();
        assert_eq!(
            adapter.emitted(),
            &[ExtractorEventType::ExtractionDataError]
        );
    }

    #[tokio::test]
    async fn test_repo_initialization() {
        let server = MockServer::start().await;
        let mut adapter = WorkerAdapter::new(
            event_with_callback(&format!("{}/cb", server.uri())),
            StateManager::in_memory(),
            WorkerOptions::default(),
        )
        .unwrap();

        adapter.initialize_repos(&["users", "cards"]);
        assert!(adapter.repo("users").is_some());
        assert!(adapter.repo("external_domain_metadata").is_none());
    }
}
