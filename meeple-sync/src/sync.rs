use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, StreamExt};
use meeple_bgg::{BggError, CollectionItem};
use meeple_core::{GameDetails, GameStatus};
use meeple_db::{AddOutcome, StoreError, add_to_library, find_game_by_bgg_id, upsert_game};
use rusqlite::Connection;
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::error::SyncError;
use crate::provider::CollectionProvider;

/// Attempts per item before a transient failure is recorded as permanent.
const RETRY_ATTEMPTS: u32 = 3;

/// Initial retry backoff; doubles after each attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Options for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Maximum concurrent detail fetches.
    pub max_workers: usize,
    /// Re-fetch details for games already in the catalog. When false, known
    /// games are attached from their stored rows without a network call.
    pub refresh_metadata: bool,
    /// Attach every item with this status instead of the listing's flags.
    pub status_override: Option<GameStatus>,
    /// Cooperative cancellation, set from a Ctrl-C handler or UI. Items not
    /// yet started are skipped; in-flight items finish and are recorded.
    pub cancel: Arc<AtomicBool>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_workers: 4,
            refresh_metadata: true,
            status_override: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Progress events emitted during a sync, consumed by the CLI.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Requesting the collection listing (BGG may queue the export).
    FetchingCollection,
    /// Listing fetched, total items to process.
    CollectionFetched { total: usize },
    /// An item has started processing (assigned to a worker).
    GameStarted { index: usize, name: String },
    /// A new game was added to the library.
    GameAdded { index: usize, name: String },
    /// The game was already in the library; its entry was left untouched.
    GameConfirmed { index: usize, name: String },
    /// The item was cancelled before it started.
    GameSkipped { index: usize, name: String },
    /// The item failed after retries (non-fatal).
    GameFailed {
        index: usize,
        name: String,
        reason: String,
    },
    /// All items processed.
    Done,
}

/// A single item that could not be synced.
#[derive(Debug, Clone)]
pub struct SyncFailure {
    pub bgg_id: i64,
    pub name: String,
    pub reason: String,
}

/// Totals for one sync invocation.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub added: usize,
    pub already_present: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncOutcome {
    /// One-line summary for logs and the CLI.
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} already present, {} failed, {} skipped",
            self.added, self.already_present, self.failed, self.skipped
        )
    }
}

/// Internal result from resolving a single listing item.
enum ItemResult {
    /// Ready for the write phase. `details` is `None` when the stored row
    /// should be reused (refresh off).
    Resolved {
        index: usize,
        item: CollectionItem,
        details: Option<GameDetails>,
    },
    /// Cancelled before the fetch started.
    Skipped { index: usize, item: CollectionItem },
    /// Detail fetch failed after retries.
    Failed {
        index: usize,
        item: CollectionItem,
        error: BggError,
    },
}

/// Sync a user's BGG collection into the local library.
///
/// Fetches the collection listing, resolves each item's details with bounded
/// parallelism, then writes sequentially on the calling task (SQLite
/// connections stay on one thread). Per-item failures are recorded in the
/// outcome; only the listing fetch is fatal. BGG listings can be momentarily
/// incomplete, so absent items are never removed; repeated runs converge on
/// the full collection.
pub async fn sync_collection<P: CollectionProvider>(
    provider: &P,
    conn: &Connection,
    username: &str,
    user_id: i64,
    options: &SyncOptions,
    events: mpsc::UnboundedSender<SyncEvent>,
) -> Result<SyncOutcome, SyncError> {
    let _ = events.send(SyncEvent::FetchingCollection);
    let items = provider.fetch_collection(username).await?;

    let total = items.len();
    let _ = events.send(SyncEvent::CollectionFetched { total });
    log::info!("collection for {} lists {} items", username, total);

    // Decide which items need a detail fetch. With refresh off, games
    // already in the catalog reuse their stored rows.
    let mut work = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        let needs_fetch =
            options.refresh_metadata || find_game_by_bgg_id(conn, item.bgg_id)?.is_none();
        work.push((index, item, needs_fetch));
    }

    let results: Vec<ItemResult> = stream::iter(work)
        .map(|(index, item, needs_fetch)| {
            let events = events.clone();
            let cancel = options.cancel.clone();
            async move {
                if cancel.load(Ordering::Relaxed) {
                    return ItemResult::Skipped { index, item };
                }

                let _ = events.send(SyncEvent::GameStarted {
                    index,
                    name: item.name.clone(),
                });

                if !needs_fetch {
                    return ItemResult::Resolved {
                        index,
                        item,
                        details: None,
                    };
                }

                match fetch_with_retry(provider, item.bgg_id).await {
                    Ok(details) => ItemResult::Resolved {
                        index,
                        item,
                        details: Some(details),
                    },
                    Err(error) => ItemResult::Failed { index, item, error },
                }
            }
        })
        .buffer_unordered(options.max_workers.max(1))
        .collect()
        .await;

    // Write phase, back on the invoking task.
    let mut outcome = SyncOutcome::default();
    for result in results {
        match result {
            ItemResult::Resolved {
                index,
                item,
                details,
            } => match attach_item(conn, user_id, &item, details, options.status_override) {
                Ok(AddOutcome::Added(_)) => {
                    outcome.added += 1;
                    let _ = events.send(SyncEvent::GameAdded {
                        index,
                        name: item.name,
                    });
                }
                Ok(AddOutcome::AlreadyPresent(_)) => {
                    outcome.already_present += 1;
                    let _ = events.send(SyncEvent::GameConfirmed {
                        index,
                        name: item.name,
                    });
                }
                Err(e) => {
                    log::warn!("failed to store {} ({}): {}", item.name, item.bgg_id, e);
                    record_failure(&mut outcome, &events, index, &item, e.to_string());
                }
            },
            ItemResult::Skipped { index, item } => {
                outcome.skipped += 1;
                let _ = events.send(SyncEvent::GameSkipped {
                    index,
                    name: item.name,
                });
            }
            ItemResult::Failed { index, item, error } => {
                log::warn!("failed to fetch {} ({}): {}", item.name, item.bgg_id, error);
                record_failure(&mut outcome, &events, index, &item, error.to_string());
            }
        }
    }

    let _ = events.send(SyncEvent::Done);
    log::info!("sync for {} finished: {}", username, outcome.summary());
    Ok(outcome)
}

/// Upsert the game row (or reuse the stored one) and attach it to the
/// user's library.
fn attach_item(
    conn: &Connection,
    user_id: i64,
    item: &CollectionItem,
    details: Option<GameDetails>,
    status_override: Option<GameStatus>,
) -> Result<AddOutcome, StoreError> {
    let game = match details {
        Some(details) => upsert_game(conn, &details)?,
        None => match find_game_by_bgg_id(conn, item.bgg_id)? {
            Some(existing) => existing,
            None => upsert_game(conn, &listing_details(item))?,
        },
    };
    let status = status_override.unwrap_or(item.status);
    add_to_library(conn, user_id, game.id, status)
}

/// Fetch details for one game, retrying transient failures with exponential
/// backoff.
async fn fetch_with_retry<P: CollectionProvider>(
    provider: &P,
    bgg_id: i64,
) -> Result<GameDetails, BggError> {
    let mut delay = RETRY_BASE_DELAY;
    let mut attempt = 1;
    loop {
        match provider.fetch_details(bgg_id).await {
            Ok(details) => return Ok(details),
            Err(e) if attempt < RETRY_ATTEMPTS && e.is_retryable() => {
                log::debug!(
                    "fetch for {} failed (attempt {}): {}; retrying in {:?}",
                    bgg_id,
                    attempt,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// The sparse record a listing entry yields when no detail fetch happens.
fn listing_details(item: &CollectionItem) -> GameDetails {
    let mut details = GameDetails::bare(item.bgg_id, item.name.clone());
    details.year_published = item.year_published;
    details
}

fn record_failure(
    outcome: &mut SyncOutcome,
    events: &mpsc::UnboundedSender<SyncEvent>,
    index: usize,
    item: &CollectionItem,
    reason: String,
) {
    outcome.failed += 1;
    outcome.failures.push(SyncFailure {
        bgg_id: item.bgg_id,
        name: item.name.clone(),
        reason: reason.clone(),
    });
    let _ = events.send(SyncEvent::GameFailed {
        index,
        name: item.name.clone(),
        reason,
    });
}
