use meeple_bgg::BggError;
use meeple_db::StoreError;

/// Errors that abort a sync run outright.
///
/// Per-item fetch and store failures never surface here; they are folded
/// into the run's `SyncOutcome` instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to fetch collection listing: {0}")]
    Listing(#[from] BggError),

    #[error("library store error: {0}")]
    Store(#[from] StoreError),
}
