//! Client for the BoardGameGeek XML API.
//!
//! Wraps the three public endpoints the rest of the workspace needs:
//! free-text search, full game metadata ("thing") and user collection
//! listings. Requests are rate limited so bulk synchronization stays inside
//! BGG's tolerance for automated clients, and queued collection exports are
//! polled until they resolve.

pub mod client;
pub mod error;
pub mod types;
pub mod xml;

pub use client::BggClient;
pub use error::BggError;
pub use types::{CollectionItem, SearchResult};
pub use xml::MAX_SEARCH_RESULTS;
