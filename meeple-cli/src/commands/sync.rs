use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::sync::mpsc;

use meeple_bgg::BggClient;
use meeple_sync::{SyncEvent, SyncOptions, run_with_events, sync_collection};

use crate::commands::{open_store, parse_status};
use crate::error::CliError;

pub(crate) fn run_sync(
    db_path: &Path,
    username: &str,
    user_id: i64,
    workers: usize,
    no_refresh: bool,
    status: Option<&str>,
) -> Result<(), CliError> {
    let status_override = status.map(parse_status).transpose()?;
    let conn = open_store(db_path)?;
    let client = BggClient::new()?;

    let options = SyncOptions {
        max_workers: workers,
        refresh_metadata: !no_refresh,
        status_override,
        ..SyncOptions::default()
    };

    println!(
        "Syncing collection for {}",
        username.if_supports_color(Stdout, |t| t.cyan()),
    );
    println!(
        "Database: {}",
        db_path.display().if_supports_color(Stdout, |t| t.dimmed()),
    );
    if no_refresh {
        println!(
            "{}",
            "Refresh off: games already in the library keep their stored details"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if let Some(status) = options.status_override {
        println!(
            "{}",
            format!("Status override: {}", status.as_str())
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    println!();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    rt.block_on(async {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("/-\\|"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        let (tx, rx) = mpsc::unbounded_channel();
        let mut total = 0usize;

        let result = run_with_events(
            sync_collection(&client, &conn, username, user_id, &options, tx),
            rx,
            |event| match event {
                SyncEvent::FetchingCollection => {
                    pb.set_message(format!("Fetching collection for {}...", username));
                }
                SyncEvent::CollectionFetched { total: count } => {
                    total = count;
                    pb.set_message(format!("{} games in collection", count));
                }
                SyncEvent::GameStarted { index, ref name } => {
                    pb.set_message(format!("[{}/{}] {}", index + 1, total, name));
                }
                SyncEvent::GameFailed {
                    ref name,
                    ref reason,
                    ..
                } => {
                    pb.set_message(format!("{} failed: {}", name, reason));
                }
                SyncEvent::Done => {
                    pb.finish_and_clear();
                }
                _ => {}
            },
        )
        .await;
        pb.finish_and_clear();

        let outcome = result?;

        if outcome.added == 0
            && outcome.already_present == 0
            && outcome.failed == 0
            && outcome.skipped == 0
        {
            println!(
                "{}",
                "Nothing to sync.".if_supports_color(Stdout, |t| t.dimmed()),
            );
            return Ok(());
        }

        println!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
        if outcome.added > 0 {
            println!(
                "  {} {} added",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                outcome.added,
            );
        }
        if outcome.already_present > 0 {
            println!(
                "  {} {} already in library",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                outcome.already_present,
            );
        }
        if outcome.skipped > 0 {
            println!(
                "  {} {} skipped",
                "?".if_supports_color(Stdout, |t| t.yellow()),
                outcome.skipped,
            );
        }
        if outcome.failed > 0 {
            println!(
                "  {} {} failed",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                outcome.failed,
            );
            for failure in &outcome.failures {
                println!(
                    "      {} ({}): {}",
                    failure.name, failure.bgg_id, failure.reason,
                );
            }
        }

        Ok(())
    })
}
