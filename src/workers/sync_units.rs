//! External sync units worker
//!
//! Presents each Trello board as an external sync unit with its card
//! count. Card counts are fetched concurrently, one paginated count per
//! board; a failed count yields the `-1` sentinel rather than failing
//! the whole extraction.

use crate::adapter::{ExtractionWorker, WorkerAdapter};
use crate::error::Result;
use crate::events::{ExternalSyncUnit, ExtractorEvent, ExtractorEventType};
use crate::trello::{Board, TrelloClient};
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

/// Worker for `EXTRACTION_EXTERNAL_SYNC_UNITS_START`
pub struct SyncUnitsWorker;

impl SyncUnitsWorker {
    async fn extract(&self, adapter: &mut WorkerAdapter) -> Result<Vec<ExternalSyncUnit>> {
        let trello = adapter.trello_client()?;
        let boards = trello.fetch_boards().await?;

        if boards.is_empty() {
            info!("No boards found");
            return Ok(Vec::new());
        }

        info!("Fetched {} boards, counting cards", boards.len());

        let counts = join_all(
            boards
                .iter()
                .map(|board| count_board_cards(&trello, board)),
        )
        .await;

        let units = boards
            .iter()
            .zip(counts)
            .map(|(board, item_count)| to_sync_unit(board, item_count))
            .collect();

        Ok(units)
    }
}

async fn count_board_cards(trello: &TrelloClient, board: &Board) -> i64 {
    match trello.fetch_card_count(&board.id).await {
        Ok(count) => count as i64,
        Err(e) => {
            warn!("Failed to count cards for board {}: {}", board.id, e);
            -1
        }
    }
}

fn to_sync_unit(board: &Board, item_count: i64) -> ExternalSyncUnit {
    let description = if board.desc.is_empty() {
        format!("Trello board: {}", board.name)
    } else {
        board.desc.clone()
    };

    ExternalSyncUnit {
        id: board.id.clone(),
        name: board.name.clone(),
        description,
        item_type: "cards".to_string(),
        item_count,
    }
}

#[async_trait]
impl ExtractionWorker for SyncUnitsWorker {
    fn name(&self) -> &'static str {
        "external-sync-units"
    }

    async fn run(&self, adapter: &mut WorkerAdapter) -> Result<()> {
        match self.extract(adapter).await {
            Ok(units) => {
                info!("Mapped {} boards to external sync units", units.len());
                adapter.state().update(|s| s.sync_units.completed = true).await;
                adapter
                    .emit(
                        ExtractorEvent::new(ExtractorEventType::ExtractionExternalSyncUnitsDone)
                            .with_sync_units(units),
                    )
                    .await
            }
            Err(e) => {
                adapter
                    .state()
                    .update(|s| s.sync_units.error = Some(e.to_string()))
                    .await;
                adapter
                    .emit(ExtractorEvent::error(
                        ExtractorEventType::ExtractionExternalSyncUnitsError,
                        e.to_string(),
                    ))
                    .await
            }
        }
    }

    async fn on_timeout(&self, adapter: &mut WorkerAdapter) -> Result<()> {
        adapter
            .emit(ExtractorEvent::error(
                ExtractorEventType::ExtractionExternalSyncUnitsError,
                "Lambda timeout",
            ))
            .await
    }
}
