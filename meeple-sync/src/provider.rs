use meeple_bgg::{BggClient, BggError, CollectionItem};
use meeple_core::GameDetails;

/// Remote source of collection listings and per-game details.
///
/// The engine is written against this trait so tests can script responses
/// without a network.
#[allow(async_fn_in_trait)]
pub trait CollectionProvider {
    /// Fetch the full collection listing for a username.
    async fn fetch_collection(&self, username: &str) -> Result<Vec<CollectionItem>, BggError>;

    /// Fetch full details for one game.
    async fn fetch_details(&self, bgg_id: i64) -> Result<GameDetails, BggError>;
}

impl CollectionProvider for BggClient {
    async fn fetch_collection(&self, username: &str) -> Result<Vec<CollectionItem>, BggError> {
        BggClient::fetch_collection(self, username).await
    }

    async fn fetch_details(&self, bgg_id: i64) -> Result<GameDetails, BggError> {
        BggClient::fetch_details(self, bgg_id).await
    }
}
