use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meeple_db::{CustomFields, find_game_by_bgg_id, update_custom_fields};

use crate::commands::open_store;
use crate::error::CliError;

pub(crate) fn run_customize(
    db_path: &Path,
    bgg_id: i64,
    title: Option<String>,
    core_mechanic: Option<String>,
    mechanic_1: Option<String>,
    mechanic_2: Option<String>,
) -> Result<(), CliError> {
    if title.is_none() && core_mechanic.is_none() && mechanic_1.is_none() && mechanic_2.is_none() {
        return Err(CliError::config(
            "Nothing to customize (pass --title, --core-mechanic, --mechanic-1, or --mechanic-2)",
        ));
    }

    let conn = open_store(db_path)?;

    if find_game_by_bgg_id(&conn, bgg_id)?.is_none() {
        println!(
            "{} No game with BGG id {} in the catalog",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            bgg_id,
        );
        return Ok(());
    }

    let custom = CustomFields {
        core_mechanic,
        additional_mechanic_1: mechanic_1,
        additional_mechanic_2: mechanic_2,
        custom_title: title,
    };

    let game = update_custom_fields(&conn, bgg_id, &custom)?;

    println!(
        "{} Updated {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        game.display_name().if_supports_color(Stdout, |t| t.bold()),
    );
    if let Some(ref title) = game.custom_title {
        println!("    Title:         {}", title);
    }
    if let Some(ref mechanic) = game.core_mechanic {
        println!("    Core mechanic: {}", mechanic);
    }
    if let Some(ref mechanic) = game.additional_mechanic_1 {
        println!("    Mechanic 1:    {}", mechanic);
    }
    if let Some(ref mechanic) = game.additional_mechanic_2 {
        println!("    Mechanic 2:    {}", mechanic);
    }

    Ok(())
}
