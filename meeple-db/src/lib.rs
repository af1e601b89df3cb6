//! SQLite persistence for the board game library.
//!
//! Provides schema creation, catalog and library write operations, and read
//! queries backed by SQLite (via rusqlite with the bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    add_to_library, find_game, find_game_by_bgg_id, find_library_entry, find_user_game,
    remove_from_library, set_expansion_relationship, update_custom_fields, update_user_game,
    upsert_game, AddOutcome, CustomFields, StoreError, UserGameUpdate,
};
pub use queries::{grouped_library, library_for_user, library_stats, search_games, LibraryStats};
pub use schema::{open_database, open_memory};
