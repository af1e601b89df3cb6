//! Collection sync engine.
//!
//! Pulls a BGG user's collection listing into the local library: bounded
//! parallel detail fetches, sequential database writes, per-item fault
//! isolation, and progress events for whoever is watching.

pub mod error;
pub mod events;
pub mod provider;
pub mod sync;

pub use error::SyncError;
pub use events::run_with_events;
pub use provider::CollectionProvider;
pub use sync::{SyncEvent, SyncFailure, SyncOptions, SyncOutcome, sync_collection};
