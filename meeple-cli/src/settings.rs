//! Settings file handling.
//!
//! `~/.config/meeple/settings.toml` (platform equivalent) holds the defaults
//! that command-line flags override. A missing file is not an error.

use std::path::PathBuf;

use crate::error::CliError;

/// Resolved settings with built-in defaults applied.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    /// BGG username used when `sync` gets no argument.
    pub default_username: Option<String>,
    /// Library owner id used when `--user` is absent.
    pub default_user_id: i64,
    /// Database path override.
    pub database: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the config file, falling back to defaults.
    pub(crate) fn load() -> Self {
        let section = load_config_file();
        Self {
            default_username: section.as_ref().and_then(|s| s.default_username.clone()),
            default_user_id: section
                .as_ref()
                .and_then(|s| s.default_user_id)
                .unwrap_or(1),
            database: section
                .and_then(|s| s.database)
                .map(PathBuf::from),
        }
    }
}

/// Where a setting's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SettingSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the settings file.
    ConfigFile,
    /// Built-in default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for SettingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each setting.
#[derive(Debug)]
pub(crate) struct SettingSources {
    pub default_username: SettingSource,
    pub default_user_id: SettingSource,
    pub database: SettingSource,
}

/// Determine where each setting is coming from.
pub(crate) fn setting_sources() -> SettingSources {
    let section = load_config_file();

    let default_username = if section
        .as_ref()
        .and_then(|s| s.default_username.as_ref())
        .is_some()
    {
        SettingSource::ConfigFile
    } else {
        SettingSource::Missing
    };

    let default_user_id = if section
        .as_ref()
        .and_then(|s| s.default_user_id.as_ref())
        .is_some()
    {
        SettingSource::ConfigFile
    } else {
        SettingSource::Default
    };

    let database = if std::env::var("MEEPLE_DB").is_ok() {
        SettingSource::EnvVar("MEEPLE_DB")
    } else if section.as_ref().and_then(|s| s.database.as_ref()).is_some() {
        SettingSource::ConfigFile
    } else {
        SettingSource::Default
    };

    SettingSources {
        default_username,
        default_user_id,
        database,
    }
}

/// TOML settings file format.
#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
struct SettingsFile {
    meeple: Option<MeepleSection>,
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
struct MeepleSection {
    default_username: Option<String>,
    default_user_id: Option<i64>,
    database: Option<String>,
}

/// Return the path to the settings file.
pub(crate) fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("meeple").join("settings.toml"))
}

/// Default location of the library database.
pub(crate) fn default_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("meeple").join("library.db"))
}

/// Resolve the database path.
///
/// Priority: `--db` flag > `MEEPLE_DB` environment variable > settings file >
/// platform data directory.
pub(crate) fn resolve_db_path(
    flag: Option<PathBuf>,
    settings: &Settings,
) -> Result<PathBuf, CliError> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Ok(path) = std::env::var("MEEPLE_DB") {
        return Ok(PathBuf::from(path));
    }
    if let Some(ref path) = settings.database {
        return Ok(path.clone());
    }
    default_db_path()
        .ok_or_else(|| CliError::config("Could not determine the platform data directory"))
}

/// Save settings to the config file, creating parent directories as needed.
/// Defaults are omitted from the file. Returns the path written to.
pub(crate) fn save_to_file(settings: &Settings) -> Result<PathBuf, CliError> {
    let path = config_path()
        .ok_or_else(|| CliError::config("Could not determine the config directory"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let config = SettingsFile {
        meeple: Some(MeepleSection {
            default_username: settings.default_username.clone(),
            default_user_id: if settings.default_user_id == 1 {
                None
            } else {
                Some(settings.default_user_id)
            },
            database: settings
                .database
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        }),
    };

    let toml_str = toml::to_string_pretty(&config)
        .map_err(|e| CliError::config(format!("Failed to serialize settings: {}", e)))?;

    std::fs::write(&path, toml_str)?;
    Ok(path)
}

fn load_config_file() -> Option<MeepleSection> {
    let path = config_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    let config: SettingsFile = toml::from_str(&content).ok()?;
    config.meeple
}
