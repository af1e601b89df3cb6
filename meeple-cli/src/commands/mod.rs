pub(crate) mod add;
pub(crate) mod config;
pub(crate) mod customize;
pub(crate) mod library;
pub(crate) mod link;
pub(crate) mod remove;
pub(crate) mod search;
pub(crate) mod stats;
pub(crate) mod sync;
pub(crate) mod update;

use std::io::Write;
use std::path::Path;

use meeple_core::GameStatus;

use crate::error::CliError;

/// Open the library database, creating parent directories on first use.
pub(crate) fn open_store(db_path: &Path) -> Result<rusqlite::Connection, CliError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(meeple_db::open_database(db_path)?)
}

/// Parse a `--status` value.
pub(crate) fn parse_status(value: &str) -> Result<GameStatus, CliError> {
    GameStatus::parse(value).ok_or_else(|| {
        CliError::config(format!(
            "Unknown status '{}' (expected one of: owned, wishlist, played_unowned, want_trade_sell, on_order)",
            value
        ))
    })
}

/// Ask the user a yes/no question. Anything other than `y` declines.
pub(crate) fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().unwrap();

    let mut input = String::new();
    std::io::stdin().read_line(&mut input).unwrap();

    input.trim().eq_ignore_ascii_case("y")
}
