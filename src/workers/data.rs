//! Data extraction worker (users + cards)
//!
//! One run extracts organization members and the selected board's cards,
//! emitting a single `EXTRACTION_DATA_DONE` once both stages complete.
//! Cards are walked with the `before` cursor a page at a time; the
//! cursor lives in the run state so a `CONTINUE` event picks up where
//! the previous invocation stopped. Incremental runs filter cards by
//! `dateLastActivity` against the last successful sync watermark and
//! leave the cards stage marked incomplete.

use super::WorkerOutcome;
use crate::adapter::{ExtractionWorker, WorkerAdapter};
use crate::error::Result;
use crate::events::{ExtractorEvent, ExtractorEventType};
use crate::normalize::{normalize_card, normalize_user};
use crate::pagination::BeforeCursor;
use crate::trello::{Card, TrelloClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{info, warn};

/// Page size for card extraction
const CARD_PAGE_LIMIT: u32 = 100;

/// Worker for `EXTRACTION_DATA_START` / `EXTRACTION_DATA_CONTINUE`
pub struct DataWorker;

impl DataWorker {
    async fn extract(&self, adapter: &mut WorkerAdapter) -> Result<WorkerOutcome> {
        let trello = adapter.trello_client()?;
        let incremental = adapter.event().is_incremental();

        // Watermark: event data first, then whatever the state kept
        let modified_since = match adapter.event().last_successful_sync_started() {
            Some(ts) => Some(ts.to_string()),
            None => adapter.state().snapshot().await.last_successful_sync_started,
        };

        if incremental {
            info!(
                "Incremental sync using watermark: {}",
                modified_since.as_deref().unwrap_or("none")
            );
            // Re-walk cards on every incremental run, keeping the cursor
            adapter.state().update(|s| s.cards.completed = false).await;
        }

        adapter.initialize_repos(&["users", "cards"]);

        if !adapter.state().snapshot().await.users.completed {
            self.extract_users(adapter, &trello).await?;
        } else {
            info!("Users already processed, skipping extraction");
        }

        if !adapter.state().snapshot().await.cards.completed {
            if let WorkerOutcome::Delay(delay) = self
                .extract_cards(adapter, &trello, incremental, modified_since.as_deref())
                .await?
            {
                return Ok(WorkerOutcome::Delay(delay));
            }
        } else {
            info!("Cards already processed, skipping extraction");
        }

        Ok(WorkerOutcome::Done)
    }

    async fn extract_users(&self, adapter: &mut WorkerAdapter, trello: &TrelloClient) -> Result<()> {
        let org_id = adapter.event().org_id()?.to_string();
        let members = trello.fetch_organization_members(&org_id).await?;
        info!("Fetched {} users from organization {}", members.len(), org_id);

        let items: Vec<_> = members.iter().map(normalize_user).collect();
        if let Some(repo) = adapter.repo("users") {
            repo.push(&items)?;
        }

        adapter
            .state()
            .update(|s| {
                s.users.completed = true;
                s.users.error = None;
            })
            .await;
        Ok(())
    }

    async fn extract_cards(
        &self,
        adapter: &mut WorkerAdapter,
        trello: &TrelloClient,
        incremental: bool,
        modified_since: Option<&str>,
    ) -> Result<WorkerOutcome> {
        let board_id = adapter.event().board_id()?.to_string();
        let resume_before = adapter.state().snapshot().await.cards.before;
        let mut cursor = BeforeCursor::resume(CARD_PAGE_LIMIT, resume_before);

        info!(
            "Starting cards extraction for board {}{}",
            board_id,
            cursor
                .before()
                .map(|b| format!(" with before={b}"))
                .unwrap_or_default()
        );

        while !cursor.is_done() {
            let page = match trello
                .fetch_cards(&board_id, Some(cursor.limit()), cursor.before())
                .await
            {
                Ok(page) => page,
                Err(e) if e.api_delay() > 0 => return Ok(WorkerOutcome::Delay(e.api_delay())),
                Err(e) => return Err(e),
            };

            // Creator enrichment; a rate limit here pauses the whole run
            let creators = match self.fetch_creators(trello, &page).await {
                Ok(creators) => creators,
                Err(RateLimit(delay)) => return Ok(WorkerOutcome::Delay(delay)),
            };

            let items: Vec<_> = page
                .iter()
                .zip(creators.iter())
                .filter(|(card, _)| passes_watermark(card, incremental, modified_since))
                .map(|(card, creator)| normalize_card(card, creator.as_deref()))
                .collect();

            if !items.is_empty() {
                if let Some(repo) = adapter.repo("cards") {
                    repo.push(&items)?;
                }
            }

            cursor.advance(page.first().map(|c| c.id.as_str()), page.len());

            // Persist the cursor so a CONTINUE event resumes here
            let before = cursor.before().map(str::to_string);
            adapter
                .state()
                .update(|s| s.cards.before = before)
                .await;
        }

        info!(
            "Cards extraction finished: {} cards over {} pages",
            cursor.records_fetched(),
            cursor.pages_fetched()
        );

        let watermark = modified_since.map(str::to_string);
        adapter
            .state()
            .update(|s| {
                // Incremental runs stay incomplete so the next watermark applies
                s.cards.completed = !incremental;
                s.cards.before = None;
                s.cards.error = None;
                if incremental {
                    s.cards.modified_since = watermark;
                }
            })
            .await;

        Ok(WorkerOutcome::Done)
    }

    async fn fetch_creators(
        &self,
        trello: &TrelloClient,
        cards: &[Card],
    ) -> std::result::Result<Vec<Option<String>>, RateLimit> {
        let results = join_all(
            cards
                .iter()
                .map(|card| trello.fetch_card_create_action(&card.id)),
        )
        .await;

        let mut creators = Vec::with_capacity(results.len());
        for (card, result) in cards.iter().zip(results) {
            match result {
                Ok(actions) => {
                    creators.push(actions.first().and_then(|a| a.id_member_creator.clone()));
                }
                Err(e) if e.api_delay() > 0 => return Err(RateLimit(e.api_delay())),
                Err(e) => {
                    warn!("Failed to fetch create action for card {}: {}", card.id, e);
                    creators.push(None);
                }
            }
        }
        Ok(creators)
    }
}

/// Rate-limit marker bubbling out of the enrichment fan-out
struct RateLimit(u64);

fn passes_watermark(card: &Card, incremental: bool, modified_since: Option<&str>) -> bool {
    if !incremental {
        return true;
    }
    let Some(watermark) = modified_since else {
        return true;
    };
    let Ok(watermark) = DateTime::parse_from_rfc3339(watermark) else {
        return true;
    };

    card.date_last_activity
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .is_some_and(|activity| activity.with_timezone(&Utc) >= watermark.with_timezone(&Utc))
}

#[async_trait]
impl ExtractionWorker for DataWorker {
    fn name(&self) -> &'static str {
        "data-extraction"
    }

    async fn run(&self, adapter: &mut WorkerAdapter) -> Result<()> {
        match self.extract(adapter).await {
            Ok(WorkerOutcome::Done) => {
                let artifacts = adapter.repos().artifacts();
                adapter
                    .emit(
                        ExtractorEvent::new(ExtractorEventType::ExtractionDataDone)
                            .with_artifacts(artifacts),
                    )
                    .await
            }
            Ok(WorkerOutcome::Delay(delay)) => {
                info!("Rate limited, emitting delay of {}s", delay);
                adapter
                    .emit(ExtractorEvent::delay(
                        ExtractorEventType::ExtractionDataDelay,
                        delay,
                    ))
                    .await
            }
            Err(e) => {
                let message = e.to_string();
                adapter
                    .state()
                    .update(|s| {
                        if !s.users.completed {
                            s.users.error = Some(message.clone());
                        } else {
                            s.cards.error = Some(message.clone());
                        }
                    })
                    .await;
                adapter
                    .emit(ExtractorEvent::error(
                        ExtractorEventType::ExtractionDataError,
                        message,
                    ))
                    .await
            }
        }
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
