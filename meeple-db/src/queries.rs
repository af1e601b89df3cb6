//! Read queries over the library database.

use meeple_core::{group_library, Game, GameStatus, GroupedGame, LibraryEntry, UserGame};
use rusqlite::{params, Connection};

use crate::operations::{row_to_game, StoreError};

// ── Library Views ───────────────────────────────────────────────────────────

/// Fetch a user's full library, each entry pairing the association row with
/// its game. Ordered by game name; display ordering is the grouping
/// engine's job.
pub fn library_for_user(conn: &Connection, user_id: i64) -> Result<Vec<LibraryEntry>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.bgg_id, g.name, g.year_published, g.min_players, g.max_players,
                g.playing_time, g.min_age, g.description, g.image_url, g.thumbnail_url,
                g.rating, g.complexity, g.categories, g.mechanics, g.designers,
                g.publishers, g.is_expansion, g.base_game_bgg_id, g.core_mechanic,
                g.additional_mechanic_1, g.additional_mechanic_2, g.custom_title,
                g.created_at, g.updated_at,
                u.id, u.user_id, u.game_id, u.status, u.personal_rating, u.notes, u.date_added
         FROM user_games u
         JOIN games g ON g.id = u.game_id
         WHERE u.user_id = ?1
         ORDER BY g.name COLLATE NOCASE",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        let status: String = row.get(28)?;
        Ok(LibraryEntry {
            game: row_to_game(row)?,
            user_game: UserGame {
                id: row.get(25)?,
                user_id: row.get(26)?,
                game_id: row.get(27)?,
                status: GameStatus::from_str_loose(&status),
                personal_rating: row.get(29)?,
                notes: row.get(30)?,
                date_added: row.get(31)?,
            },
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Fetch a user's library grouped into base games with their expansions.
pub fn grouped_library(conn: &Connection, user_id: i64) -> Result<Vec<GroupedGame>, StoreError> {
    let entries = library_for_user(conn, user_id)?;
    Ok(group_library(entries))
}

// ── Catalog Search ──────────────────────────────────────────────────────────

/// Search stored games by name or custom title (case-insensitive LIKE).
pub fn search_games(conn: &Connection, term: &str) -> Result<Vec<Game>, StoreError> {
    let pattern = format!("%{}%", term);
    let mut stmt = conn.prepare(
        "SELECT id, bgg_id, name, year_published, min_players, max_players, playing_time,
                min_age, description, image_url, thumbnail_url, rating, complexity,
                categories, mechanics, designers, publishers, is_expansion, base_game_bgg_id,
                core_mechanic, additional_mechanic_1, additional_mechanic_2, custom_title,
                created_at, updated_at
         FROM games
         WHERE name LIKE ?1 OR custom_title LIKE ?1
         ORDER BY name COLLATE NOCASE
         LIMIT 100",
    )?;
    let rows = stmt.query_map(params![pattern], row_to_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Per-user library statistics for the `stats` command.
#[derive(Debug)]
pub struct LibraryStats {
    pub total: i64,
    pub owned: i64,
    pub wishlist: i64,
    pub played_unowned: i64,
    pub want_trade_sell: i64,
    pub on_order: i64,
    pub base_games: i64,
    pub expansions: i64,
    pub rated: i64,
}

/// Compute library statistics for one user.
pub fn library_stats(conn: &Connection, user_id: i64) -> Result<LibraryStats, StoreError> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user_games WHERE user_id = ?1",
        params![user_id],
        |r| r.get(0),
    )?;
    let base_games: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user_games u JOIN games g ON g.id = u.game_id
         WHERE u.user_id = ?1 AND g.is_expansion = 0",
        params![user_id],
        |r| r.get(0),
    )?;
    let expansions: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user_games u JOIN games g ON g.id = u.game_id
         WHERE u.user_id = ?1 AND g.is_expansion = 1",
        params![user_id],
        |r| r.get(0),
    )?;
    let rated: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user_games WHERE user_id = ?1 AND personal_rating IS NOT NULL",
        params![user_id],
        |r| r.get(0),
    )?;

    Ok(LibraryStats {
        total,
        owned: count_by_status(conn, user_id, GameStatus::Owned)?,
        wishlist: count_by_status(conn, user_id, GameStatus::Wishlist)?,
        played_unowned: count_by_status(conn, user_id, GameStatus::PlayedUnowned)?,
        want_trade_sell: count_by_status(conn, user_id, GameStatus::WantTradeSell)?,
        on_order: count_by_status(conn, user_id, GameStatus::OnOrder)?,
        base_games,
        expansions,
        rated,
    })
}

fn count_by_status(
    conn: &Connection,
    user_id: i64,
    status: GameStatus,
) -> Result<i64, StoreError> {
    conn.query_row(
        "SELECT COUNT(*) FROM user_games WHERE user_id = ?1 AND status = ?2",
        params![user_id, status.as_str()],
        |r| r.get(0),
    )
    .map_err(Into::into)
}
