//! meeple CLI
//!
//! Command-line interface for syncing a BoardGameGeek collection into a
//! local library and browsing it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meeple_bgg::BggError;
use meeple_sync::SyncError;

mod commands;
mod error;
mod settings;

use error::CliError;
use settings::Settings;

#[derive(Parser)]
#[command(name = "meeple")]
#[command(about = "Sync and browse a BoardGameGeek game library", long_about = None)]
struct Cli {
    /// Path to the library database (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Library owner id (defaults to the configured default_user_id)
    #[arg(long, global = true)]
    user: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync a BGG user's collection into the library
    Sync {
        /// BGG username (defaults to the configured default_username)
        username: Option<String>,

        /// Maximum concurrent detail fetches
        #[arg(long, default_value_t = 4)]
        workers: usize,

        /// Keep stored details for games already in the catalog
        #[arg(long)]
        no_refresh: bool,

        /// Record every synced game with this status instead of the listing's
        #[arg(long)]
        status: Option<String>,
    },

    /// Search BGG for games by name
    Search {
        /// Name or part of a name to search for
        term: String,
    },

    /// List the library with expansions grouped under their base game
    Library {
        /// Print the grouped library as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a single game to the library by BGG id
    Add {
        bgg_id: i64,

        /// Status to record (owned, wishlist, played_unowned, want_trade_sell, on_order)
        #[arg(long, default_value = "owned")]
        status: String,
    },

    /// Remove a game from the library
    Remove {
        bgg_id: i64,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Update status, personal rating, or notes for a library entry
    Update {
        bgg_id: i64,

        /// New status
        #[arg(long)]
        status: Option<String>,

        /// Personal rating (1-10)
        #[arg(long)]
        rating: Option<f64>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Set user-curated overrides on a game (an empty string clears a field)
    Customize {
        bgg_id: i64,

        /// Custom display title
        #[arg(long)]
        title: Option<String>,

        /// Core mechanic label
        #[arg(long)]
        core_mechanic: Option<String>,

        /// First additional mechanic label
        #[arg(long)]
        mechanic_1: Option<String>,

        /// Second additional mechanic label
        #[arg(long)]
        mechanic_2: Option<String>,
    },

    /// Mark a game as an expansion of a base game
    Link {
        /// BGG id of the expansion
        bgg_id: i64,

        /// BGG id of the base game
        base_bgg_id: i64,
    },

    /// Clear a game's expansion relationship
    Unlink { bgg_id: i64 },

    /// Show library statistics
    Stats,

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current settings and their sources
    Show,

    /// Interactively set up the settings file
    Setup,

    /// Print the settings file path
    Path,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = Settings::load();
    let user_id = cli.user.unwrap_or(settings.default_user_id);

    let db_path = match settings::resolve_db_path(cli.db, &settings) {
        Ok(path) => path,
        Err(e) => {
            eprintln!(
                "{} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            std::process::exit(1);
        }
    };
    log::debug!("using database at {}", db_path.display());

    let result = match cli.command {
        Commands::Sync {
            username,
            workers,
            no_refresh,
            status,
        } => match username.or_else(|| settings.default_username.clone()) {
            Some(username) => commands::sync::run_sync(
                &db_path,
                &username,
                user_id,
                workers,
                no_refresh,
                status.as_deref(),
            ),
            None => Err(CliError::config(
                "No username given and no default_username in settings (run 'meeple config setup')",
            )),
        },
        Commands::Search { term } => commands::search::run_search(&term),
        Commands::Library { json } => commands::library::run_library(&db_path, user_id, json),
        Commands::Add { bgg_id, status } => {
            commands::add::run_add(&db_path, bgg_id, &status, user_id)
        }
        Commands::Remove { bgg_id, yes } => {
            commands::remove::run_remove(&db_path, bgg_id, user_id, yes)
        }
        Commands::Update {
            bgg_id,
            status,
            rating,
            notes,
        } => commands::update::run_update(
            &db_path,
            bgg_id,
            user_id,
            status.as_deref(),
            rating,
            notes,
        ),
        Commands::Customize {
            bgg_id,
            title,
            core_mechanic,
            mechanic_1,
            mechanic_2,
        } => commands::customize::run_customize(
            &db_path,
            bgg_id,
            title,
            core_mechanic,
            mechanic_1,
            mechanic_2,
        ),
        Commands::Link { bgg_id, base_bgg_id } => {
            commands::link::run_link(&db_path, bgg_id, base_bgg_id)
        }
        Commands::Unlink { bgg_id } => commands::link::run_unlink(&db_path, bgg_id),
        Commands::Stats => commands::stats::run_stats(&db_path, user_id),
        Commands::Config { action } => {
            match action {
                ConfigAction::Show => commands::config::run_config_show(),
                ConfigAction::Setup => commands::config::run_config_setup(),
                ConfigAction::Path => commands::config::run_config_path(),
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!(
            "{} {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            e,
        );
        match &e {
            CliError::Sync(SyncError::Listing(BggError::CollectionQueued { .. })) => {
                eprintln!();
                eprintln!("BGG is still preparing the collection export. Try again in a minute.");
            }
            CliError::Sync(SyncError::Listing(err)) if err.is_retryable() => {
                eprintln!();
                eprintln!("The collection fetch failed on a transient error. Try again shortly.");
            }
            _ => {}
        }
        std::process::exit(1);
    }
}
