use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meeple_db::{find_game_by_bgg_id, set_expansion_relationship};

use crate::commands::open_store;
use crate::error::CliError;

pub(crate) fn run_link(db_path: &Path, bgg_id: i64, base_bgg_id: i64) -> Result<(), CliError> {
    let conn = open_store(db_path)?;

    set_expansion_relationship(&conn, bgg_id, true, Some(base_bgg_id))?;

    let name = display_name_or_id(&conn, bgg_id)?;
    match find_game_by_bgg_id(&conn, base_bgg_id)? {
        Some(base) => {
            println!(
                "{} {} is now an expansion of {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                name.if_supports_color(Stdout, |t| t.bold()),
                base.display_name().if_supports_color(Stdout, |t| t.bold()),
            );
        }
        None => {
            println!(
                "{} {} is now an expansion of BGG id {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                name.if_supports_color(Stdout, |t| t.bold()),
                base_bgg_id,
            );
            println!(
                "{} The base game is not in the catalog; the expansion is listed on its own until it is added",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            );
        }
    }

    Ok(())
}

pub(crate) fn run_unlink(db_path: &Path, bgg_id: i64) -> Result<(), CliError> {
    let conn = open_store(db_path)?;

    set_expansion_relationship(&conn, bgg_id, false, None)?;

    let name = display_name_or_id(&conn, bgg_id)?;
    println!(
        "{} {} is no longer marked as an expansion",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        name.if_supports_color(Stdout, |t| t.bold()),
    );

    Ok(())
}

fn display_name_or_id(conn: &rusqlite::Connection, bgg_id: i64) -> Result<String, CliError> {
    Ok(find_game_by_bgg_id(conn, bgg_id)?
        .map(|g| g.display_name().to_string())
        .unwrap_or_else(|| format!("game {}", bgg_id)))
}
