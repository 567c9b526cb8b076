//! Metadata extraction worker
//!
//! Pushes the generated external domain metadata to its repository
//! verbatim (no normalization) and emits `EXTRACTION_METADATA_DONE`.

use crate::adapter::{ExtractionWorker, WorkerAdapter};
use crate::error::Result;
use crate::events::{ExtractorEvent, ExtractorEventType};
use crate::metadata::external_domain_metadata;
use async_trait::async_trait;
use tracing::info;

/// Worker for `EXTRACTION_METADATA_START`
pub struct MetadataWorker;

#[async_trait]
impl ExtractionWorker for MetadataWorker {
    fn name(&self) -> &'static str {
        "metadata-extraction"
    }

    async fn run(&self, adapter: &mut WorkerAdapter) -> Result<()> {
        adapter.initialize_repos(&["external_domain_metadata"]);

        let metadata = external_domain_metadata();
        let result = match adapter.repo("external_domain_metadata") {
            Some(repo) => repo.push(&[metadata]),
            None => Ok(()),
        };

        match result {
            Ok(()) => {
                info!("Metadata extraction completed");
                adapter
                    .emit(ExtractorEvent::new(ExtractorEventType::ExtractionMetadataDone))
                    .await
            }
            Err(e) => {
                adapter
                    .emit(ExtractorEvent::error(
                        ExtractorEventType::ExtractionMetadataError,
                        e.to_string(),
                    ))
                    .await
            }
        }
    }

    async fn on_timeout(&self, adapter: &mut WorkerAdapter) -> Result<()> {
        adapter
            .emit(ExtractorEvent::error(
                ExtractorEventType::ExtractionMetadataError,
                "Lambda timeout",
            ))
            .await
    }
}
