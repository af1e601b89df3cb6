use std::io::Write;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::settings::{self, SettingSource, Settings};

/// Show current settings and where each value comes from.
pub(crate) fn run_config_show() {
    let path = settings::config_path();
    let sources = settings::setting_sources();
    let current = Settings::load();

    println!(
        "{}",
        "Meeple Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    println!();

    match &path {
        Some(p) if p.exists() => {
            println!(
                "  Settings file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            println!(
                "  Settings file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            println!(
                "  Settings file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    println!();

    let database = match sources.database {
        SettingSource::EnvVar(var) => std::env::var(var).ok(),
        _ => current
            .database
            .as_ref()
            .map(|p| p.display().to_string())
            .or_else(|| settings::default_db_path().map(|p| p.display().to_string())),
    };

    let fields: &[(&str, &SettingSource, Option<String>)] = &[
        (
            "default_username",
            &sources.default_username,
            current.default_username.clone(),
        ),
        (
            "default_user_id",
            &sources.default_user_id,
            Some(current.default_user_id.to_string()),
        ),
        ("database", &sources.database, database),
    ];

    for (name, source, value) in fields {
        let source_str = format!("({})", source);
        match value {
            Some(v) => {
                println!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    v,
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
            None => {
                println!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    "not set".if_supports_color(Stdout, |t| t.yellow()),
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
        }
    }
}

/// Interactively set up the settings file.
pub(crate) fn run_config_setup() {
    println!(
        "{}",
        "Meeple Settings Setup".if_supports_color(Stdout, |t| t.bold()),
    );
    println!();

    // Load existing settings as defaults
    let existing = Settings::load();

    let read_line = |prompt: &str, default: Option<&str>| -> Option<String> {
        if let Some(def) = default {
            print!("  {} [{}]: ", prompt, def);
        } else {
            print!("  {}: ", prompt);
        }
        std::io::stdout().flush().unwrap();

        let mut input = String::new();
        std::io::stdin().read_line(&mut input).unwrap();
        let trimmed = input.trim().to_string();

        if trimmed.is_empty() {
            return default.map(|d| d.to_string());
        }
        Some(trimmed)
    };

    println!(
        "  {}",
        "Press Enter to keep the shown value, or to leave a setting unset."
            .if_supports_color(Stdout, |t| t.dimmed()),
    );

    let default_username = read_line(
        "default_username (BGG username)",
        existing.default_username.as_deref(),
    );

    let user_id_default = existing.default_user_id.to_string();
    let default_user_id = loop {
        // Always has a default, so read_line never returns None here.
        match read_line("default_user_id", Some(user_id_default.as_str())) {
            Some(v) => match v.parse::<i64>() {
                Ok(n) => break n,
                Err(_) => println!(
                    "    {}",
                    "Must be a number.".if_supports_color(Stdout, |t| t.yellow()),
                ),
            },
            None => break existing.default_user_id,
        }
    };

    let database_default = existing.database.as_ref().map(|p| p.display().to_string());
    let database = read_line("database (path)", database_default.as_deref());

    let updated = Settings {
        default_username,
        default_user_id,
        database: database.map(PathBuf::from),
    };

    match settings::save_to_file(&updated) {
        Ok(path) => {
            println!();
            println!(
                "{} Settings saved to {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                path.display().if_supports_color(Stdout, |t| t.cyan()),
            );
        }
        Err(e) => {
            eprintln!();
            eprintln!(
                "{} Failed to save settings: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
        }
    }
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    match settings::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Could not determine config directory");
            std::process::exit(1);
        }
    }
}
