use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meeple_db::library_stats;

use crate::commands::open_store;
use crate::error::CliError;

pub(crate) fn run_stats(db_path: &Path, user_id: i64) -> Result<(), CliError> {
    let conn = open_store(db_path)?;
    let stats = library_stats(&conn, user_id)?;

    println!(
        "{}",
        "Library statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    println!(
        "  Database: {}",
        db_path.display().if_supports_color(Stdout, |t| t.dimmed()),
    );
    println!();
    println!("  Total entries:    {:>8}", stats.total);
    println!("  Base games:       {:>8}", stats.base_games);
    println!("  Expansions:       {:>8}", stats.expansions);
    println!();
    println!("  Owned:            {:>8}", stats.owned);
    println!("  Wishlist:         {:>8}", stats.wishlist);
    println!("  Played (unowned): {:>8}", stats.played_unowned);
    println!("  Want trade/sell:  {:>8}", stats.want_trade_sell);
    println!("  On order:         {:>8}", stats.on_order);
    println!();
    println!("  Rated:            {:>8}", stats.rated);

    Ok(())
}
