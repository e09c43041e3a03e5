//! Persisted application settings.
//!
//! Settings live in a small TOML file under the app root: the last opened
//! media file (reopened on startup), the folder the open dialog starts in,
//! and the recent-files capacity. Missing file means defaults; a broken file
//! is a recoverable error the caller logs before falling back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::atomic_file::write_atomic;
use crate::mru;

/// Default filename used to store the app settings.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Filename of the persisted recent-files list.
pub const RECENT_FILES_FILE_NAME: &str = "recent.txt";

/// Errors that may occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to resolve the application directory.
    #[error(transparent)]
    AppDir(#[from] app_dirs::AppDirError),
    /// Failed to read the settings file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to write the settings file.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse the settings file.
    #[error("Invalid settings at {path}: {source}")]
    Parse {
        /// Settings file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    /// Failed to serialize settings to TOML.
    #[error("Failed to serialize settings for {path}: {source}")]
    Serialize {
        /// Settings file path.
        path: PathBuf,
        /// TOML serialization error.
        source: toml::ser::Error,
    },
}

/// User-level settings the session persists between launches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// File reopened (without autoplay) on the next launch.
    pub last_file: Option<PathBuf>,
    /// Folder the open-file dialog starts in.
    pub last_audio_folder: Option<PathBuf>,
    /// Maximum number of recent-files entries.
    pub recent_capacity: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            last_file: None,
            last_audio_folder: None,
            recent_capacity: mru::DEFAULT_CAPACITY,
        }
    }
}

/// Resolve the settings file path inside the app root.
pub fn settings_path() -> Result<PathBuf, SettingsError> {
    Ok(app_dirs::app_root_dir()?.join(SETTINGS_FILE_NAME))
}

/// Resolve the recent-files list path inside the app root.
pub fn recent_files_path() -> Result<PathBuf, SettingsError> {
    Ok(app_dirs::app_root_dir()?.join(RECENT_FILES_FILE_NAME))
}

/// Load settings from `path`, returning defaults when the file is missing.
pub fn load_or_default(path: &Path) -> Result<AppSettings, SettingsError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppSettings::default());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&text).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist settings to `path`, overwriting any previous contents atomically.
pub fn save(settings: &AppSettings, path: &Path) -> Result<(), SettingsError> {
    let text = toml::to_string_pretty(settings).map_err(|source| SettingsError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, text.as_bytes()).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}
