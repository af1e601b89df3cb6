//! Domain types and library grouping for the meeple board game collection.
//!
//! This crate defines the data model shared by the BGG client, the SQLite
//! stores, and the sync engine, without any I/O dependencies. Consumers can
//! use these types directly for display or pass them to `meeple-db` for
//! persistence.

pub mod grouping;
pub mod types;

pub use grouping::group_library;
pub use types::*;
