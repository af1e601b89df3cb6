use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meeple_db::{find_game_by_bgg_id, find_library_entry, remove_from_library};

use crate::commands::{confirm, open_store};
use crate::error::CliError;

pub(crate) fn run_remove(
    db_path: &Path,
    bgg_id: i64,
    user_id: i64,
    yes: bool,
) -> Result<(), CliError> {
    let conn = open_store(db_path)?;

    let game = match find_game_by_bgg_id(&conn, bgg_id)? {
        Some(game) => game,
        None => {
            println!(
                "{} No game with BGG id {} in the catalog",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                bgg_id,
            );
            return Ok(());
        }
    };

    let entry = match find_library_entry(&conn, user_id, game.id)? {
        Some(entry) => entry,
        None => {
            println!(
                "{} {} is not in the library",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                game.display_name(),
            );
            return Ok(());
        }
    };

    if !yes && !confirm(&format!("Remove {} from the library?", game.display_name())) {
        println!("{}", "Cancelled.".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    // Drops the library association only; the catalog row stays.
    remove_from_library(&conn, entry.id)?;

    println!(
        "{} Removed {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        game.display_name().if_supports_color(Stdout, |t| t.bold()),
    );

    Ok(())
}
