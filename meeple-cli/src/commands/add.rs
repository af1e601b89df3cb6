use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meeple_bgg::BggClient;
use meeple_db::{AddOutcome, add_to_library, upsert_game};

use crate::commands::{open_store, parse_status};
use crate::error::CliError;

pub(crate) fn run_add(
    db_path: &Path,
    bgg_id: i64,
    status: &str,
    user_id: i64,
) -> Result<(), CliError> {
    let status = parse_status(status)?;
    let conn = open_store(db_path)?;
    let client = BggClient::new()?;

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("/-\\|"),
    );
    pb.set_message(format!("Fetching details for {}...", bgg_id));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let details = rt.block_on(client.fetch_details(bgg_id));
    pb.finish_and_clear();
    let details = details?;

    let game = upsert_game(&conn, &details)?;

    match add_to_library(&conn, user_id, game.id, status)? {
        AddOutcome::Added(_) => {
            println!(
                "{} Added {} [{}]",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                game.display_name().if_supports_color(Stdout, |t| t.bold()),
                status.as_str(),
            );
        }
        AddOutcome::AlreadyPresent(existing) => {
            println!(
                "{} {} is already in the library [{}]",
                "?".if_supports_color(Stdout, |t| t.yellow()),
                game.display_name(),
                existing.status.as_str(),
            );
        }
    }

    Ok(())
}
