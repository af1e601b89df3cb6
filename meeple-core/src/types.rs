//! Data model types for the board game library.
//!
//! These types represent the persistent schema (games and per-user library
//! associations) plus the derived records the grouping engine and sync
//! engine hand around.

use serde::{Deserialize, Serialize};

// ── Game ────────────────────────────────────────────────────────────────────

/// A canonical board game record, one row per BGG id.
#[derive(Debug, Clone, Serialize)]
pub struct Game {
    pub id: i64,
    /// External key on BoardGameGeek. Unique across all games.
    pub bgg_id: i64,
    pub name: String,
    pub year_published: Option<i32>,
    pub min_players: Option<i32>,
    pub max_players: Option<i32>,
    /// Typical play time in minutes.
    pub playing_time: Option<i32>,
    pub min_age: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// BGG community average rating (1-10). Absent when unrated.
    pub rating: Option<f64>,
    /// BGG complexity weight (1-5). Absent when unrated.
    pub complexity: Option<f64>,
    pub categories: Vec<String>,
    pub mechanics: Vec<String>,
    pub designers: Vec<String>,
    pub publishers: Vec<String>,
    pub is_expansion: bool,
    /// BGG id of the base game this entry expands. Meaningful only when
    /// `is_expansion` is true; never equal to this game's own `bgg_id`.
    pub base_game_bgg_id: Option<i64>,
    /// User-curated overrides. Sync never writes these.
    pub core_mechanic: Option<String>,
    pub additional_mechanic_1: Option<String>,
    pub additional_mechanic_2: Option<String>,
    pub custom_title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Game {
    /// Title used for display and sorting: the custom title when the user
    /// set one, the BGG name otherwise.
    pub fn display_name(&self) -> &str {
        self.custom_title.as_deref().unwrap_or(&self.name)
    }
}

/// Metadata for one game as fetched from the external source, before it
/// lands in the catalog.
///
/// Every field except `bgg_id` and `name` is optional: an absent field means
/// the source did not supply it, and the catalog store leaves any existing
/// value alone rather than blanking it. Set fields keep the order they
/// arrived in.
#[derive(Debug, Clone)]
pub struct GameDetails {
    pub bgg_id: i64,
    pub name: String,
    pub year_published: Option<i32>,
    pub min_players: Option<i32>,
    pub max_players: Option<i32>,
    pub playing_time: Option<i32>,
    pub min_age: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub rating: Option<f64>,
    pub complexity: Option<f64>,
    pub categories: Vec<String>,
    pub mechanics: Vec<String>,
    pub designers: Vec<String>,
    pub publishers: Vec<String>,
    pub is_expansion: bool,
    pub base_game_bgg_id: Option<i64>,
}

impl GameDetails {
    /// Minimal details carrying only identity and name. Useful when a
    /// listing entry has to be stored before its full metadata is known.
    pub fn bare(bgg_id: i64, name: impl Into<String>) -> Self {
        Self {
            bgg_id,
            name: name.into(),
            year_published: None,
            min_players: None,
            max_players: None,
            playing_time: None,
            min_age: None,
            description: None,
            image_url: None,
            thumbnail_url: None,
            rating: None,
            complexity: None,
            categories: Vec::new(),
            mechanics: Vec::new(),
            designers: Vec::new(),
            publishers: Vec::new(),
            is_expansion: false,
            base_game_bgg_id: None,
        }
    }
}

// ── User Library ────────────────────────────────────────────────────────────

/// A user's ownership record for a specific game.
#[derive(Debug, Clone, Serialize)]
pub struct UserGame {
    pub id: i64,
    pub user_id: i64,
    /// Internal id of the game row, not the BGG id.
    pub game_id: i64,
    pub status: GameStatus,
    pub personal_rating: Option<f64>,
    pub notes: Option<String>,
    pub date_added: String,
}

/// Ownership status of a library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Owned,
    Wishlist,
    PlayedUnowned,
    WantTradeSell,
    OnOrder,
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Owned
    }
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::Wishlist => "wishlist",
            Self::PlayedUnowned => "played_unowned",
            Self::WantTradeSell => "want_trade_sell",
            Self::OnOrder => "on_order",
        }
    }

    /// Strict parse for user input. Accepts the stored form plus a few
    /// obvious aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "owned" | "own" => Some(Self::Owned),
            "wishlist" | "want" => Some(Self::Wishlist),
            "played_unowned" | "played" => Some(Self::PlayedUnowned),
            "want_trade_sell" | "trade" | "sell" => Some(Self::WantTradeSell),
            "on_order" | "preordered" => Some(Self::OnOrder),
            _ => None,
        }
    }

    /// Parse a stored status string, defaulting to `Owned` for anything
    /// unrecognized.
    pub fn from_str_loose(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

/// A `UserGame` joined with its `Game`, the unit the grouping engine and
/// presentation layers consume.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryEntry {
    pub user_game: UserGame,
    pub game: Game,
}

// ── Grouping Output ─────────────────────────────────────────────────────────

/// A base game and the expansions of it present in one user's library.
///
/// Derived on demand from the current library. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedGame {
    pub base: LibraryEntry,
    pub expansions: Vec<LibraryEntry>,
    /// Base plus expansions.
    pub total_count: usize,
}
