use meeple_core::GameStatus;

/// One hit from the search endpoint.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub bgg_id: i64,
    pub name: String,
    pub year_published: Option<i32>,
}

/// One entry from a user's collection listing.
///
/// The listing carries only identity and ownership flags; full metadata
/// comes from a separate details fetch.
#[derive(Debug, Clone)]
pub struct CollectionItem {
    pub bgg_id: i64,
    pub name: String,
    pub year_published: Option<i32>,
    pub status: GameStatus,
}
