use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meeple_db::{UserGameUpdate, find_game_by_bgg_id, find_library_entry, update_user_game};

use crate::commands::{open_store, parse_status};
use crate::error::CliError;

pub(crate) fn run_update(
    db_path: &Path,
    bgg_id: i64,
    user_id: i64,
    status: Option<&str>,
    rating: Option<f64>,
    notes: Option<String>,
) -> Result<(), CliError> {
    if status.is_none() && rating.is_none() && notes.is_none() {
        return Err(CliError::config(
            "Nothing to update (pass --status, --rating, or --notes)",
        ));
    }

    let changes = UserGameUpdate {
        status: status.map(parse_status).transpose()?,
        personal_rating: rating,
        notes,
    };

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

    let updated = update_user_game(&conn, entry.id, &changes)?;

    println!(
        "{} Updated {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        game.display_name().if_supports_color(Stdout, |t| t.bold()),
    );
    println!("    Status: {}", updated.status.as_str());
    if let Some(rating) = updated.personal_rating {
        println!("    Rating: {}", rating);
    }
    if let Some(ref notes) = updated.notes {
        println!("    Notes:  {}", notes);
    }

    Ok(())
}
