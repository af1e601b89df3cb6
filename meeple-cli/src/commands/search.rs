use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meeple_bgg::BggClient;

use crate::error::CliError;

pub(crate) fn run_search(term: &str) -> Result<(), CliError> {
    let client = BggClient::new()?;

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    let results = rt.block_on(client.search(term))?;

    if results.is_empty() {
        println!(
            "{}",
            format!("No results for \"{}\".", term).if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    println!(
        "{} results for {}:",
        results.len(),
        term.if_supports_color(Stdout, |t| t.cyan()),
    );
    println!();

    for result in &results {
        let year = match result.year_published {
            Some(year) => format!(" ({})", year)
                .if_supports_color(Stdout, |t| t.dimmed())
                .to_string(),
            None => String::new(),
        };
        println!(
            "  {}  {}{}",
            format!("{:>8}", result.bgg_id).if_supports_color(Stdout, |t| t.bold()),
            result.name,
            year,
        );
    }
    println!();
    println!(
        "{}",
        "Add one with: meeple add <id>".if_supports_color(Stdout, |t| t.dimmed()),
    );

    Ok(())
}
