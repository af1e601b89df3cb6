use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use meeple_core::GameDetails;

use crate::error::BggError;
use crate::types::{CollectionItem, SearchResult};
use crate::xml;

const BASE_URL: &str = "https://boardgamegeek.com/xmlapi2";
/// BGG throttles clients that go much past one request per second.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1100);
/// How often to re-poll a queued collection export before giving up.
const COLLECTION_POLL_ATTEMPTS: u32 = 5;
/// Delay before the first re-poll; doubles per attempt up to the cap.
const COLLECTION_POLL_BASE: Duration = Duration::from_secs(2);
const COLLECTION_POLL_MAX: Duration = Duration::from_secs(15);

/// HTTP client for the BGG XML API with rate limiting.
pub struct BggClient {
    http: reqwest::Client,
    last_request: Arc<Mutex<Instant>>,
}

impl BggClient {
    pub fn new() -> Result<Self, BggError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("meeple/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            last_request: Arc::new(Mutex::new(Instant::now() - MIN_REQUEST_INTERVAL)),
        })
    }

    /// Search games and expansions by free-text term.
    ///
    /// Results are capped at [`xml::MAX_SEARCH_RESULTS`]; an empty list is a
    /// valid no-match answer.
    pub async fn search(&self, term: &str) -> Result<Vec<SearchResult>, BggError> {
        let body = self
            .get(
                "search",
                &[("query", term), ("type", "boardgame,boardgameexpansion")],
            )
            .await?;
        xml::parse_search(&body)
    }

    /// Fetch full metadata for one game by BGG id.
    pub async fn fetch_details(&self, bgg_id: i64) -> Result<GameDetails, BggError> {
        let id = bgg_id.to_string();
        let body = self.get("thing", &[("id", id.as_str()), ("stats", "1")]).await?;
        xml::parse_thing(&body)
    }

    /// Fetch a user's collection listing.
    ///
    /// BGG queues collection exports and answers HTTP 202 until the export
    /// is ready. This polls with growing delays and, if the export is still
    /// pending after the last poll, fails with a retryable error so callers
    /// can simply run the sync again.
    pub async fn fetch_collection(&self, username: &str) -> Result<Vec<CollectionItem>, BggError> {
        let mut delay = COLLECTION_POLL_BASE;
        for attempt in 1..=COLLECTION_POLL_ATTEMPTS {
            let resp = self.request("collection", &[("username", username)]).await?;
            if resp.status() != reqwest::StatusCode::ACCEPTED {
                let body = check_status(resp).await?;
                return xml::parse_collection(&body);
            }
            if attempt < COLLECTION_POLL_ATTEMPTS {
                log::debug!(
                    "collection export for '{}' still queued (poll {}/{}), waiting {:?}",
                    username,
                    attempt,
                    COLLECTION_POLL_ATTEMPTS,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(COLLECTION_POLL_MAX);
            }
        }
        Err(BggError::CollectionQueued {
            attempts: COLLECTION_POLL_ATTEMPTS,
        })
    }

    /// One rate-limited GET, returning the raw response. `fetch_collection`
    /// needs to see the 202 status itself, so no status mapping here.
    async fn request(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, BggError> {
        self.rate_limit().await;
        let resp = self
            .http
            .get(format!("{}/{}", BASE_URL, path))
            .query(query)
            .send()
            .await?;
        Ok(resp)
    }

    /// Rate-limited GET returning the body, with common status mapping.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String, BggError> {
        let resp = self.request(path, query).await?;
        check_status(resp).await
    }

    /// Enforce rate limiting: wait until at least MIN_REQUEST_INTERVAL has
    /// passed since the last API request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }
}

/// Map non-success statuses onto the error taxonomy and read the body.
async fn check_status(resp: reqwest::Response) -> Result<String, BggError> {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(BggError::RateLimited);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(BggError::NotFound);
    }
    if status.is_server_error() {
        return Err(BggError::Server {
            status: status.as_u16(),
        });
    }
    if status.is_client_error() {
        return Err(BggError::InvalidRequest {
            status: status.as_u16(),
        });
    }
    Ok(resp.text().await?)
}
