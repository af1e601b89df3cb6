//! Write operations for the game catalog and user library.

use meeple_core::{Game, GameDetails, GameStatus, UserGame};
use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }

    pub fn invalid_relationship(msg: impl Into<String>) -> Self {
        StoreError::InvalidRelationship(msg.into())
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        StoreError::InvalidValue(msg.into())
    }
}

// ── Game Catalog Operations ─────────────────────────────────────────────────

/// Insert or refresh a game from fetched metadata. Returns the stored row.
///
/// Keyed on `bgg_id`. Fields the source left unset (and sets it left empty)
/// never overwrite existing values, so a thin fetch cannot blank out a rich
/// row. The user-curated columns are not in the update list at all.
/// `is_expansion` always follows the source, since the source states it for
/// every item. Safe to call repeatedly with the same input.
pub fn upsert_game(conn: &Connection, details: &GameDetails) -> Result<Game, StoreError> {
    if details.base_game_bgg_id == Some(details.bgg_id) {
        return Err(StoreError::invalid_relationship(format!(
            "game {} cannot be its own base game",
            details.bgg_id
        )));
    }

    conn.execute(
        "INSERT INTO games (bgg_id, name, year_published, min_players, max_players,
             playing_time, min_age, description, image_url, thumbnail_url,
             rating, complexity, categories, mechanics, designers, publishers,
             is_expansion, base_game_bgg_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
         ON CONFLICT(bgg_id) DO UPDATE SET
             name = excluded.name,
             year_published = COALESCE(excluded.year_published, year_published),
             min_players = COALESCE(excluded.min_players, min_players),
             max_players = COALESCE(excluded.max_players, max_players),
             playing_time = COALESCE(excluded.playing_time, playing_time),
             min_age = COALESCE(excluded.min_age, min_age),
             description = COALESCE(excluded.description, description),
             image_url = COALESCE(excluded.image_url, image_url),
             thumbnail_url = COALESCE(excluded.thumbnail_url, thumbnail_url),
             rating = COALESCE(excluded.rating, rating),
             complexity = COALESCE(excluded.complexity, complexity),
             categories = COALESCE(excluded.categories, categories),
             mechanics = COALESCE(excluded.mechanics, mechanics),
             designers = COALESCE(excluded.designers, designers),
             publishers = COALESCE(excluded.publishers, publishers),
             is_expansion = excluded.is_expansion,
             base_game_bgg_id = COALESCE(excluded.base_game_bgg_id, base_game_bgg_id),
             updated_at = datetime('now')",
        params![
            details.bgg_id,
            details.name,
            details.year_published,
            details.min_players,
            details.max_players,
            details.playing_time,
            details.min_age,
            details.description,
            details.image_url,
            details.thumbnail_url,
            details.rating,
            details.complexity,
            set_to_json(&details.categories)?,
            set_to_json(&details.mechanics)?,
            set_to_json(&details.designers)?,
            set_to_json(&details.publishers)?,
            details.is_expansion,
            details.base_game_bgg_id,
        ],
    )?;

    find_game_by_bgg_id(conn, details.bgg_id)?
        .ok_or_else(|| StoreError::not_found("game", details.bgg_id))
}

/// Mark a game as an expansion of another (or clear the relationship).
///
/// Validates the self-reference rule before any mutation. Clearing the
/// expansion flag always clears the base reference too. The base game does
/// not have to exist in the catalog yet; grouping degrades such entries to
/// standalone until it does.
pub fn set_expansion_relationship(
    conn: &Connection,
    bgg_id: i64,
    is_expansion: bool,
    base_game_bgg_id: Option<i64>,
) -> Result<(), StoreError> {
    if base_game_bgg_id == Some(bgg_id) {
        return Err(StoreError::invalid_relationship(format!(
            "game {bgg_id} cannot be its own base game"
        )));
    }

    let base = if is_expansion { base_game_bgg_id } else { None };
    let changed = conn.execute(
        "UPDATE games SET is_expansion = ?2, base_game_bgg_id = ?3, updated_at = datetime('now')
         WHERE bgg_id = ?1",
        params![bgg_id, is_expansion, base],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("game", bgg_id));
    }
    Ok(())
}

/// New values for the user-curated columns. `None` leaves a column
/// unchanged; an empty string clears it.
#[derive(Debug, Clone, Default)]
pub struct CustomFields {
    pub core_mechanic: Option<String>,
    pub additional_mechanic_1: Option<String>,
    pub additional_mechanic_2: Option<String>,
    pub custom_title: Option<String>,
}

/// Update the user-curated override columns on a game. Returns the updated
/// row. These columns belong to the user; sync never touches them.
pub fn update_custom_fields(
    conn: &Connection,
    bgg_id: i64,
    custom: &CustomFields,
) -> Result<Game, StoreError> {
    let changed = conn.execute(
        "UPDATE games SET
             core_mechanic = CASE WHEN ?2 IS NULL THEN core_mechanic WHEN ?2 = '' THEN NULL ELSE ?2 END,
             additional_mechanic_1 = CASE WHEN ?3 IS NULL THEN additional_mechanic_1 WHEN ?3 = '' THEN NULL ELSE ?3 END,
             additional_mechanic_2 = CASE WHEN ?4 IS NULL THEN additional_mechanic_2 WHEN ?4 = '' THEN NULL ELSE ?4 END,
             custom_title = CASE WHEN ?5 IS NULL THEN custom_title WHEN ?5 = '' THEN NULL ELSE ?5 END,
             updated_at = datetime('now')
         WHERE bgg_id = ?1",
        params![
            bgg_id,
            custom.core_mechanic,
            custom.additional_mechanic_1,
            custom.additional_mechanic_2,
            custom.custom_title,
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("game", bgg_id));
    }
    find_game_by_bgg_id(conn, bgg_id)?.ok_or_else(|| StoreError::not_found("game", bgg_id))
}

/// Find a game by its BGG id.
pub fn find_game_by_bgg_id(conn: &Connection, bgg_id: i64) -> Result<Option<Game>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, bgg_id, name, year_published, min_players, max_players, playing_time,
                min_age, description, image_url, thumbnail_url, rating, complexity,
                categories, mechanics, designers, publishers, is_expansion, base_game_bgg_id,
                core_mechanic, additional_mechanic_1, additional_mechanic_2, custom_title,
                created_at, updated_at
         FROM games WHERE bgg_id = ?1",
    )?;
    let result = stmt.query_row(params![bgg_id], row_to_game);
    match result {
        Ok(game) => Ok(Some(game)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find a game by its internal row id.
pub fn find_game(conn: &Connection, id: i64) -> Result<Option<Game>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, bgg_id, name, year_published, min_players, max_players, playing_time,
                min_age, description, image_url, thumbnail_url, rating, complexity,
                categories, mechanics, designers, publishers, is_expansion, base_game_bgg_id,
                core_mechanic, additional_mechanic_1, additional_mechanic_2, custom_title,
                created_at, updated_at
         FROM games WHERE id = ?1",
    )?;
    let result = stmt.query_row(params![id], row_to_game);
    match result {
        Ok(game) => Ok(Some(game)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── User Library Operations ─────────────────────────────────────────────────

/// Result of an add-to-library attempt.
#[derive(Debug)]
pub enum AddOutcome {
    /// A new association was created.
    Added(UserGame),
    /// The pair already existed; the stored row is returned untouched.
    AlreadyPresent(UserGame),
}

/// Associate a game with a user's library.
///
/// Duplicate pairs are absorbed by the `UNIQUE(user_id, game_id)` constraint
/// rather than surfaced as errors, so concurrent attempts for the same pair
/// leave exactly one row. An existing row keeps its status.
pub fn add_to_library(
    conn: &Connection,
    user_id: i64,
    game_id: i64,
    status: GameStatus,
) -> Result<AddOutcome, StoreError> {
    let inserted = conn.execute(
        "INSERT INTO user_games (user_id, game_id, status)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, game_id) DO NOTHING",
        params![user_id, game_id, status.as_str()],
    )?;

    let row = find_library_entry(conn, user_id, game_id)?
        .ok_or_else(|| StoreError::not_found("library entry for game", game_id))?;
    Ok(if inserted == 1 {
        AddOutcome::Added(row)
    } else {
        AddOutcome::AlreadyPresent(row)
    })
}

/// Find the library row for a (user, game) pair.
pub fn find_library_entry(
    conn: &Connection,
    user_id: i64,
    game_id: i64,
) -> Result<Option<UserGame>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, game_id, status, personal_rating, notes, date_added
         FROM user_games WHERE user_id = ?1 AND game_id = ?2",
    )?;
    let result = stmt.query_row(params![user_id, game_id], row_to_user_game);
    match result {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find a library row by its own id.
pub fn find_user_game(
    conn: &Connection,
    user_game_id: i64,
) -> Result<Option<UserGame>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, game_id, status, personal_rating, notes, date_added
         FROM user_games WHERE id = ?1",
    )?;
    let result = stmt.query_row(params![user_game_id], row_to_user_game);
    match result {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A partial update to a library entry. `None` fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UserGameUpdate {
    pub status: Option<GameStatus>,
    pub personal_rating: Option<f64>,
    pub notes: Option<String>,
}

/// Apply a partial update to a library entry. Returns the updated row.
pub fn update_user_game(
    conn: &Connection,
    user_game_id: i64,
    changes: &UserGameUpdate,
) -> Result<UserGame, StoreError> {
    if let Some(rating) = changes.personal_rating {
        if !(1.0..=10.0).contains(&rating) {
            return Err(StoreError::invalid_value(format!(
                "personal rating must be between 1 and 10, got {rating}"
            )));
        }
    }

    let changed = conn.execute(
        "UPDATE user_games SET
             status = COALESCE(?2, status),
             personal_rating = COALESCE(?3, personal_rating),
             notes = COALESCE(?4, notes)
         WHERE id = ?1",
        params![
            user_game_id,
            changes.status.map(|s| s.as_str()),
            changes.personal_rating,
            changes.notes,
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("library entry", user_game_id));
    }
    find_user_game(conn, user_game_id)?
        .ok_or_else(|| StoreError::not_found("library entry", user_game_id))
}

/// Remove a library entry.
pub fn remove_from_library(conn: &Connection, user_game_id: i64) -> Result<(), StoreError> {
    let changed = conn.execute(
        "DELETE FROM user_games WHERE id = ?1",
        params![user_game_id],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("library entry", user_game_id));
    }
    Ok(())
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

pub(crate) fn row_to_game(row: &rusqlite::Row<'_>) -> rusqlite::Result<Game> {
    Ok(Game {
        id: row.get(0)?,
        bgg_id: row.get(1)?,
        name: row.get(2)?,
        year_published: row.get(3)?,
        min_players: row.get(4)?,
        max_players: row.get(5)?,
        playing_time: row.get(6)?,
        min_age: row.get(7)?,
        description: row.get(8)?,
        image_url: row.get(9)?,
        thumbnail_url: row.get(10)?,
        rating: row.get(11)?,
        complexity: row.get(12)?,
        categories: json_set_column(row, 13)?,
        mechanics: json_set_column(row, 14)?,
        designers: json_set_column(row, 15)?,
        publishers: json_set_column(row, 16)?,
        is_expansion: row.get(17)?,
        base_game_bgg_id: row.get(18)?,
        core_mechanic: row.get(19)?,
        additional_mechanic_1: row.get(20)?,
        additional_mechanic_2: row.get(21)?,
        custom_title: row.get(22)?,
        created_at: row.get(23)?,
        updated_at: row.get(24)?,
    })
}

pub(crate) fn row_to_user_game(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserGame> {
    let status: String = row.get(3)?;
    Ok(UserGame {
        id: row.get(0)?,
        user_id: row.get(1)?,
        game_id: row.get(2)?,
        status: GameStatus::from_str_loose(&status),
        personal_rating: row.get(4)?,
        notes: row.get(5)?,
        date_added: row.get(6)?,
    })
}

/// Serialize a string set for storage. Empty sets become NULL so a blank
/// fetch never clobbers a populated column through the COALESCE merge.
fn set_to_json(values: &[String]) -> Result<Option<String>, StoreError> {
    if values.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(values)?))
    }
}

/// Decode a JSON array column, treating NULL as the empty set.
fn json_set_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(text) => serde_json::from_str(&text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        }),
        None => Ok(Vec::new()),
    }
}
