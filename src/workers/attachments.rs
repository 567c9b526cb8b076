//! Attachments extraction worker
//!
//! Walks the board's cards, collects their attachments and streams each
//! one from its source URL. A single attachment failing to download is
//! logged and skipped; a rate limit pauses the run with a DELAY event.

use super::WorkerOutcome;
use crate::adapter::{ExtractionWorker, WorkerAdapter};
use crate::error::Result;
use crate::events::{ExtractorEvent, ExtractorEventType};
use crate::normalize::{normalize_attachment, NormalizedAttachment};
use crate::pagination::BeforeCursor;
use async_trait::async_trait;
use tracing::{info, warn};

/// Page size for the card walk feeding the attachment scan
const CARD_PAGE_LIMIT: u32 = 100;

/// Worker for `EXTRACTION_ATTACHMENTS_START` / `EXTRACTION_ATTACHMENTS_CONTINUE`
pub struct AttachmentsWorker;

impl AttachmentsWorker {
    async fn extract(&self, adapter: &mut WorkerAdapter) -> Result<WorkerOutcome> {
        let trello = adapter.trello_client()?;
        let board_id = adapter.event().board_id()?.to_string();

        adapter.initialize_repos(&["attachments"]);

        let mut cursor = BeforeCursor::new(CARD_PAGE_LIMIT);
        let mut streamed: Vec<NormalizedAttachment> = Vec::new();

        while !cursor.is_done() {
            let page = match trello
                .fetch_cards(&board_id, Some(cursor.limit()), cursor.before())
                .await
            {
                Ok(page) => page,
                Err(e) if e.api_delay() > 0 => return Ok(WorkerOutcome::Delay(e.api_delay())),
                Err(e) => return Err(e),
            };

            for card in &page {
                for attachment in &card.attachments {
                    match trello.download_attachment(&attachment.url).await {
                        Ok(body) => {
                            info!(
                                "Streamed attachment {} ({} bytes)",
                                attachment.id,
                                body.len()
                            );
                            streamed.push(normalize_attachment(attachment, &card.id));
                        }
                        Err(e) if e.api_delay() > 0 => {
                            return Ok(WorkerOutcome::Delay(e.api_delay()))
                        }
                        Err(e) => {
                            warn!(
                                "Error while fetching attachment {} from URL: {}",
                                attachment.id, e
                            );
                        }
                    }
                }
            }

            cursor.advance(page.first().map(|c| c.id.as_str()), page.len());
        }

        if let Some(repo) = adapter.repo("attachments") {
            repo.push(&streamed)?;
        }

        adapter
            .state()
            .update(|s| {
                s.attachments.completed = true;
                s.attachments.error = None;
            })
            .await;

        Ok(WorkerOutcome::Done)
    }
}

#[async_trait]
impl ExtractionWorker for AttachmentsWorker {
    fn name(&self) -> &'static str {
        "attachments-extraction"
    }

    async fn run(&self, adapter: &mut WorkerAdapter) -> Result<()> {
        match self.extract(adapter).await {
            Ok(WorkerOutcome::Done) => {
                let artifacts = adapter.repos().artifacts();
                adapter
                    .emit(
                        ExtractorEvent::new(ExtractorEventType::ExtractionAttachmentsDone)
                            .with_artifacts(artifacts),
                    )
                    .await
            }
            Ok(WorkerOutcome::Delay(delay)) => {
                info!("Rate limited, emitting delay of {}s", delay);
                adapter
                    .emit(ExtractorEvent::delay(
                        ExtractorEventType::ExtractionAttachmentsDelay,
                        delay,
                    ))
                    .await
            }
            Err(e) => {
                let message = e.to_string();
                adapter
                    .state()
                    .update(|s| {
                        s.attachments.completed = false;
                        s.attachments.error = Some(message.clone());
                    })
                    .await;
                adapter
                    .emit(ExtractorEvent::error(
                        ExtractorEventType::ExtractionAttachmentsError,
                        message,
                    ))
                    .await
            }
        }
    }

    async fn on_timeout(&self, adapter: &mut WorkerAdapter) -> Result<()> {
        adapter
            .emit(ExtractorEvent::error(
                ExtractorEventType::ExtractionAttachmentsError,
                "Lambda timeout",
            ))
            .await
    }
}
