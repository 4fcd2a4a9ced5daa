//! User settings, persisted as TOML.
//!
//! The file is `--config` when given, otherwise `settings.toml` in the
//! platform configuration folder (`~/.config/medbook/` on Linux).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Datelike;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "medbook";
const APP_NAME: &str = "Medbook";
const CONFIG_FILENAME: &str = "settings.toml";

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub display: DisplaySettings,
}

/// Where the doctor catalog comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Catalog JSON file; the built-in sample catalog when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Year used when expanding slot dates, which carry none.
    pub appointment_year: i32,
    /// Maximum table width in columns.
    pub table_width: u16,
    /// Include the underlying error in the failure notice.
    pub show_error_details: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            appointment_year: chrono::Local::now().year(),
            table_width: 100,
            show_error_details: false,
        }
    }
}

/// Default settings file location.
///
/// Returns `None` if the platform-specific directory cannot be determined.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// `explicit` when given, otherwise the default location.
pub fn resolve_settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(settings_path)
}

/// Read one settings file. A missing file is `Ok(None)`.
pub fn read_settings(path: &Path) -> Result<Option<Settings>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(error).with_context(|| format!("read {}", path.display())),
    };
    toml::from_str(&content)
        .map(Some)
        .with_context(|| format!("parse {}", path.display()))
}

/// Settings for this run. Never fails: an unknown location, a missing
/// file and an unreadable file all give the defaults.
pub fn load_settings(explicit: Option<&Path>) -> Settings {
    let Some(path) = resolve_settings_path(explicit) else {
        tracing::warn!("no settings location, using defaults");
        return Settings::default();
    };
    match read_settings(&path) {
        Ok(Some(settings)) => {
            tracing::info!(path = %path.display(), "settings loaded");
            settings
        }
        Ok(None) => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Settings::default()
        }
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "settings unreadable, using defaults");
            Settings::default()
        }
    }
}

/// Save settings to `explicit`, or to the default location.
///
/// Creates the parent directory if needed and returns the written path.
pub fn save_settings(settings: &Settings, explicit: Option<&Path>) -> Result<PathBuf> {
    let path = resolve_settings_path(explicit)
        .ok_or_else(|| anyhow!("could not determine settings path"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(settings).context("serialize settings")?;
    fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;

    tracing::info!(path = %path.display(), "settings saved");
    Ok(path)
}
