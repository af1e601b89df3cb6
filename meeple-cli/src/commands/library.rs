use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meeple_core::LibraryEntry;
use meeple_db::grouped_library;

use crate::commands::open_store;
use crate::error::CliError;

pub(crate) fn run_library(db_path: &Path, user_id: i64, json: bool) -> Result<(), CliError> {
    let conn = open_store(db_path)?;
    let groups = grouped_library(&conn, user_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!(
            "{}",
            "Library is empty.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        println!(
            "{}",
            "Sync a BGG collection with: meeple sync <username>"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    let mut base_count = 0usize;
    let mut expansion_count = 0usize;

    for group in &groups {
        print_base(&group.base);
        base_count += 1;
        for expansion in &group.expansions {
            print_expansion(expansion);
            expansion_count += 1;
        }
    }

    println!();
    println!(
        "{} games ({} base, {} expansions)",
        base_count + expansion_count,
        base_count,
        expansion_count,
    );

    Ok(())
}

fn print_base(entry: &LibraryEntry) {
    // Expansions whose base game is not in the library show up as their
    // own group; tag them so the listing is not misleading.
    let kind = if entry.game.is_expansion {
        " (expansion)"
    } else {
        ""
    };

    println!(
        "  {}{}{} {}",
        entry
            .game
            .display_name()
            .if_supports_color(Stdout, |t| t.bold()),
        year_suffix(entry).if_supports_color(Stdout, |t| t.dimmed()),
        kind.if_supports_color(Stdout, |t| t.dimmed()),
        format!("[{}]", entry.user_game.status.as_str())
            .if_supports_color(Stdout, |t| t.dimmed()),
    );
}

fn print_expansion(entry: &LibraryEntry) {
    println!(
        "      {} {}{} {}",
        "\u{2192}".if_supports_color(Stdout, |t| t.dimmed()),
        entry.game.display_name(),
        year_suffix(entry).if_supports_color(Stdout, |t| t.dimmed()),
        format!("[{}]", entry.user_game.status.as_str())
            .if_supports_color(Stdout, |t| t.dimmed()),
    );
}

fn year_suffix(entry: &LibraryEntry) -> String {
    match entry.game.year_published {
        Some(year) => format!(" ({})", year),
        None => String::new(),
    }
}
