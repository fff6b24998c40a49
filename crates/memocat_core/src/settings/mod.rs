//! Application-level settings persisted as TOML.
//!
//! # Responsibility
//! - Load/save editor preferences and the recent-file list from the platform
//!   config directory.
//!
//! # Invariants
//! - A missing settings file yields defaults, never an error.
//! - Saving creates the config directory when needed.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub mod mru;

pub use mru::MruList;

const SETTINGS_FILE_NAME: &str = "settings.toml";

fn default_memo_font_family() -> String {
    "monospace".to_string()
}

fn default_memo_font_size() -> u32 {
    11
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors from settings load/save.
#[derive(Debug)]
pub enum SettingsError {
    /// Filesystem failure at the given path.
    Io { path: PathBuf, source: std::io::Error },
    /// Settings file exists but is not valid TOML for the expected shape.
    Parse { path: PathBuf, message: String },
    /// Settings cannot be encoded to TOML.
    Serialize(String),
    /// No platform config directory is available.
    NoConfigDir,
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "settings io error at {}: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "invalid settings file {}: {message}", path.display())
            }
            Self::Serialize(message) => write!(f, "cannot encode settings: {message}"),
            Self::NoConfigDir => write!(f, "no platform config directory available"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Editor preferences and file history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Font family used by memo editors.
    #[serde(default = "default_memo_font_family")]
    pub memo_font_family: String,
    /// Font size used by memo editors, in points.
    #[serde(default = "default_memo_font_size")]
    pub memo_font_size: u32,
    /// Word wrap toggle for memo editors.
    #[serde(default)]
    pub memo_word_wrap: bool,
    /// Catalog reopened on next start.
    #[serde(default)]
    pub last_catalog: Option<PathBuf>,
    /// Most-recently-used catalog files.
    #[serde(default)]
    pub recent_files: MruList,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            memo_font_family: default_memo_font_family(),
            memo_font_size: default_memo_font_size(),
            memo_word_wrap: false,
            last_catalog: None,
            recent_files: MruList::default(),
        }
    }
}

impl AppSettings {
    /// Returns the default settings file path for this platform.
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dirs =
            ProjectDirs::from("org", "memocat", "memocat").ok_or(SettingsError::NoConfigDir)?;
        Ok(dirs.config_dir().join(SETTINGS_FILE_NAME))
    }

    /// Loads settings from the default location.
    pub fn load() -> SettingsResult<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Loads settings from an explicit path; missing file yields defaults.
    pub fn load_from(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|err| SettingsError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Saves settings to the default location.
    pub fn save(&self) -> SettingsResult<()> {
        self.save_to(Self::default_path()?)
    }

    /// Saves settings to an explicit path, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> SettingsResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let raw = toml::to_string_pretty(self)
            .map_err(|err| SettingsError::Serialize(err.to_string()))?;
        fs::write(path, raw).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
