//! Extraction workers
//!
//! One worker per extraction phase, each implementing the
//! `running → done | error | timeout` contract: every invocation ends in
//! exactly one terminal event on the callback URL.

mod attachments;
mod data;
mod metadata;
mod sync_units;

pub use attachments::AttachmentsWorker;
pub use data::DataWorker;
pub use metadata::MetadataWorker;
pub use sync_units::SyncUnitsWorker;

/// How a worker body finished when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerOutcome {
    /// All work done; emit the DONE event
    Done,
    /// Upstream asked us to back off; emit a DELAY event with the seconds
    Delay(u64),
}
