//! Application use cases on top of the domain engine:
//! guard enforcement, batch application, and change-detected sync.

#![forbid(unsafe_code)]

pub mod batch;
pub mod explain;
pub mod guard;
pub mod snapshot;
pub mod sync;

pub use batch::{BatchOutput, BatchRow, BatchSummary, RowStatus, WorkRecord, apply_batch};
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use guard::{GuardError, GuardService};
pub use snapshot::SnapshotImporter;
pub use sync::{
    Extract, RESULT_SKIPPED_NO_CHANGE, RESULT_SYNCED, SyncOutcome, SyncRequest, SyncState,
    SyncSummary, run_sync,
};
