use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use meeple_bgg::{BggError, CollectionItem};
use meeple_core::{GameDetails, GameStatus};
use meeple_db::{
    CustomFields, find_game_by_bgg_id, find_library_entry, open_memory, update_custom_fields,
    upsert_game,
};
use meeple_sync::{
    CollectionProvider, SyncError, SyncEvent, SyncOptions, SyncOutcome, run_with_events,
    sync_collection,
};
use tokio::sync::mpsc;

/// Scripted provider standing in for the BGG client.
#[derive(Default)]
struct FakeProvider {
    /// Listings returned per `fetch_collection` call; the last one repeats.
    listings: Vec<Vec<CollectionItem>>,
    /// Fail the listing fetch outright.
    listing_error: bool,
    /// Scripted details per game.
    details: HashMap<i64, GameDetails>,
    /// bgg_id -> number of calls that fail with a retryable error first.
    flaky: HashMap<i64, u32>,
    /// Games that always fail with a permanent error.
    broken: HashSet<i64>,
    listing_calls: AtomicU32,
    detail_calls: Mutex<HashMap<i64, u32>>,
}

impl FakeProvider {
    fn new(items: Vec<CollectionItem>) -> Self {
        let details = items
            .iter()
            .map(|item| (item.bgg_id, full_details(item.bgg_id, &item.name)))
            .collect();
        Self {
            listings: vec![items],
            details,
            ..Self::default()
        }
    }

    fn detail_calls_for(&self, bgg_id: i64) -> u32 {
        self.detail_calls
            .lock()
            .unwrap()
            .get(&bgg_id)
            .copied()
            .unwrap_or(0)
    }
}

impl CollectionProvider for FakeProvider {
    async fn fetch_collection(&self, _username: &str) -> Result<Vec<CollectionItem>, BggError> {
        let call = self.listing_calls.fetch_add(1, Ordering::SeqCst) as usize;
        if self.listing_error {
            return Err(BggError::Server { status: 500 });
        }
        Ok(self
            .listings
            .get(call)
            .or_else(|| self.listings.last())
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_details(&self, bgg_id: i64) -> Result<GameDetails, BggError> {
        let calls = {
            let mut map = self.detail_calls.lock().unwrap();
            let count = map.entry(bgg_id).or_insert(0);
            *count += 1;
            *count
        };
        if self.broken.contains(&bgg_id) {
            return Err(BggError::parse("scripted permanent failure"));
        }
        if let Some(&failures) = self.flaky.get(&bgg_id) {
            if calls <= failures {
                return Err(BggError::RateLimited);
            }
        }
        self.details.get(&bgg_id).cloned().ok_or(BggError::NotFound)
    }
}

fn item(bgg_id: i64, name: &str, status: GameStatus) -> CollectionItem {
    CollectionItem {
        bgg_id,
        name: name.to_string(),
        year_published: None,
        status,
    }
}

fn full_details(bgg_id: i64, name: &str) -> GameDetails {
    let mut details = GameDetails::bare(bgg_id, name);
    details.year_published = Some(2000);
    details.min_players = Some(2);
    details.mechanics = vec!["Set Collection".to_string()];
    details
}

async fn run(
    provider: &FakeProvider,
    conn: &rusqlite::Connection,
    options: &SyncOptions,
) -> Result<SyncOutcome, SyncError> {
    let (tx, _rx) = mpsc::unbounded_channel();
    sync_collection(provider, conn, "testuser", 1, options, tx).await
}

fn user_game_count(conn: &rusqlite::Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM user_games", [], |r| r.get(0))
        .unwrap()
}

// -- happy path --

#[tokio::test]
async fn adds_new_games_with_details() {
    let conn = open_memory().unwrap();
    let provider = FakeProvider::new(vec![
        item(13, "Catan", GameStatus::Owned),
        item(230802, "Azul", GameStatus::Wishlist),
    ]);

    let outcome = run(&provider, &conn, &SyncOptions::default()).await.unwrap();
    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.failed, 0);

    let catan = find_game_by_bgg_id(&conn, 13).unwrap().unwrap();
    assert_eq!(catan.year_published, Some(2000));
    assert_eq!(catan.mechanics, vec!["Set Collection"]);

    let entry = find_library_entry(&conn, 1, catan.id).unwrap().unwrap();
    assert_eq!(entry.status, GameStatus::Owned);

    let azul = find_game_by_bgg_id(&conn, 230802).unwrap().unwrap();
    let entry = find_library_entry(&conn, 1, azul.id).unwrap().unwrap();
    assert_eq!(entry.status, GameStatus::Wishlist);
}

#[tokio::test]
async fn second_run_confirms_existing() {
    let conn = open_memory().unwrap();
    let provider = FakeProvider::new(vec![
        item(13, "Catan", GameStatus::Owned),
        item(230802, "Azul", GameStatus::Owned),
    ]);
    let options = SyncOptions::default();

    let first = run(&provider, &conn, &options).await.unwrap();
    assert_eq!(first.added, 2);

    let second = run(&provider, &conn, &options).await.unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(second.already_present, 2);
    assert_eq!(second.failed, 0);

    let games: i64 = conn
        .query_row("SELECT COUNT(*) FROM games", [], |r| r.get(0))
        .unwrap();
    assert_eq!(games, 2);
    assert_eq!(user_game_count(&conn), 2);
}

#[tokio::test]
async fn partial_listings_converge() {
    let conn = open_memory().unwrap();
    let mut provider = FakeProvider::new(vec![
        item(13, "Catan", GameStatus::Owned),
        item(230802, "Azul", GameStatus::Owned),
        item(174430, "Gloomhaven", GameStatus::Owned),
    ]);
    // First call sees a truncated listing, second the full one.
    let full = provider.listings[0].clone();
    provider.listings = vec![full[..2].to_vec(), full];

    let options = SyncOptions::default();
    let first = run(&provider, &conn, &options).await.unwrap();
    assert_eq!(first.added, 2);
    assert_eq!(user_game_count(&conn), 2);

    let second = run(&provider, &conn, &options).await.unwrap();
    assert_eq!(second.added, 1);
    assert_eq!(second.already_present, 2);
    assert_eq!(user_game_count(&conn), 3);
}

// -- failure isolation --

#[tokio::test]
async fn one_bad_item_does_not_abort() {
    let conn = open_memory().unwrap();
    let items: Vec<CollectionItem> = (1..=10)
        .map(|id| item(id, &format!("Game {id}"), GameStatus::Owned))
        .collect();
    let mut provider = FakeProvider::new(items);
    provider.broken.insert(7);

    let outcome = run(&provider, &conn, &SyncOptions::default()).await.unwrap();
    assert_eq!(outcome.added, 9);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].bgg_id, 7);
    assert_eq!(user_game_count(&conn), 9);
    assert!(find_game_by_bgg_id(&conn, 7).unwrap().is_none());
}

#[tokio::test]
async fn listing_failure_aborts() {
    let conn = open_memory().unwrap();
    let mut provider = FakeProvider::new(vec![item(13, "Catan", GameStatus::Owned)]);
    provider.listing_error = true;

    let result = run(&provider, &conn, &SyncOptions::default()).await;
    assert!(matches!(result, Err(SyncError::Listing(_))));

    let games: i64 = conn
        .query_row("SELECT COUNT(*) FROM games", [], |r| r.get(0))
        .unwrap();
    assert_eq!(games, 0);
}

// -- retry policy --

#[tokio::test]
async fn retries_transient_failures() {
    let conn = open_memory().unwrap();
    let mut provider = FakeProvider::new(vec![item(13, "Catan", GameStatus::Owned)]);
    provider.flaky.insert(13, 1);

    let outcome = run(&provider, &conn, &SyncOptions::default()).await.unwrap();
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.failed, 0);
    assert_eq!(provider.detail_calls_for(13), 2);
}

#[tokio::test]
async fn permanent_errors_are_not_retried() {
    let conn = open_memory().unwrap();
    let mut provider = FakeProvider::new(vec![item(42, "Broken", GameStatus::Owned)]);
    provider.broken.insert(42);

    let outcome = run(&provider, &conn, &SyncOptions::default()).await.unwrap();
    assert_eq!(outcome.failed, 1);
    assert_eq!(provider.detail_calls_for(42), 1);
}

// -- options --

#[tokio::test]
async fn status_override_wins() {
    let conn = open_memory().unwrap();
    let provider = FakeProvider::new(vec![item(13, "Catan", GameStatus::Wishlist)]);
    let options = SyncOptions {
        status_override: Some(GameStatus::Owned),
        ..SyncOptions::default()
    };

    run(&provider, &conn, &options).await.unwrap();
    let game = find_game_by_bgg_id(&conn, 13).unwrap().unwrap();
    let entry = find_library_entry(&conn, 1, game.id).unwrap().unwrap();
    assert_eq!(entry.status, GameStatus::Owned);
}

#[tokio::test]
async fn refresh_off_reuses_catalog() {
    let conn = open_memory().unwrap();
    upsert_game(&conn, &full_details(13, "Catan")).unwrap();
    update_custom_fields(
        &conn,
        13,
        &CustomFields {
            custom_title: Some("House Catan".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let provider = FakeProvider::new(vec![
        item(13, "Catan", GameStatus::Owned),
        item(230802, "Azul", GameStatus::Owned),
    ]);
    let options = SyncOptions {
        refresh_metadata: false,
        ..SyncOptions::default()
    };

    let outcome = run(&provider, &conn, &options).await.unwrap();
    assert_eq!(outcome.added, 2);
    // Known game: no network call, stored metadata untouched.
    assert_eq!(provider.detail_calls_for(13), 0);
    let catan = find_game_by_bgg_id(&conn, 13).unwrap().unwrap();
    assert_eq!(catan.custom_title.as_deref(), Some("House Catan"));
    assert_eq!(catan.year_published, Some(2000));
    // Unknown game still gets a full fetch.
    assert_eq!(provider.detail_calls_for(230802), 1);
}

#[tokio::test]
async fn cancel_skips_pending_items() {
    let conn = open_memory().unwrap();
    let provider = FakeProvider::new(vec![
        item(13, "Catan", GameStatus::Owned),
        item(230802, "Azul", GameStatus::Owned),
    ]);
    let options = SyncOptions::default();
    options.cancel.store(true, Ordering::SeqCst);

    let outcome = run(&provider, &conn, &options).await.unwrap();
    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.added, 0);
    assert_eq!(provider.detail_calls_for(13), 0);
    assert_eq!(user_game_count(&conn), 0);
}

// -- durability of user edits --

#[tokio::test]
async fn custom_fields_survive_resync() {
    let conn = open_memory().unwrap();
    let provider = FakeProvider::new(vec![item(13, "Catan", GameStatus::Owned)]);
    let options = SyncOptions::default();

    run(&provider, &conn, &options).await.unwrap();
    update_custom_fields(
        &conn,
        13,
        &CustomFields {
            custom_title: Some("House Catan".to_string()),
            core_mechanic: Some("Trading".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let outcome = run(&provider, &conn, &options).await.unwrap();
    assert_eq!(outcome.already_present, 1);

    let catan = find_game_by_bgg_id(&conn, 13).unwrap().unwrap();
    assert_eq!(catan.custom_title.as_deref(), Some("House Catan"));
    assert_eq!(catan.core_mechanic.as_deref(), Some("Trading"));
}

// -- progress events --

#[tokio::test]
async fn emits_progress_events() {
    let conn = open_memory().unwrap();
    let provider = FakeProvider::new(vec![
        item(13, "Catan", GameStatus::Owned),
        item(230802, "Azul", GameStatus::Owned),
    ]);
    let options = SyncOptions::default();

    let (tx, rx) = mpsc::unbounded_channel();
    let mut seen = Vec::new();
    let outcome = run_with_events(
        sync_collection(&provider, &conn, "testuser", 1, &options, tx),
        rx,
        |event| seen.push(event),
    )
    .await
    .unwrap();
    assert_eq!(outcome.added, 2);

    assert!(matches!(seen.first(), Some(SyncEvent::FetchingCollection)));
    assert!(
        seen.iter()
            .any(|e| matches!(e, SyncEvent::CollectionFetched { total: 2 }))
    );
    let added = seen
        .iter()
        .filter(|e| matches!(e, SyncEvent::GameAdded { .. }))
        .count();
    assert_eq!(added, 2);
    assert!(matches!(seen.last(), Some(SyncEvent::Done)));
}
