//! Application directory helpers anchored to a single `.woodshed` folder.
//!
//! Bank files, the recent-files list, settings and logs all live under one
//! root in the OS config directory. `WOODSHED_CONFIG_HOME` relocates the
//! root for portable setups; tests swap it through an in-process override.

use std::path::PathBuf;
use std::sync::{LazyLock, Mutex};

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory under the OS config root.
pub const APP_DIR_NAME: &str = ".woodshed";

static CONFIG_BASE_OVERRIDE: LazyLock<Mutex<Option<PathBuf>>> = LazyLock::new(|| Mutex::new(None));

/// Errors raised while resolving or preparing application directories.
#[derive(Debug, Error)]
pub enum AppDirError {
    /// No suitable base config directory could be resolved.
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    /// Failed to create the application directory.
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        /// Directory that failed to create.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// The root `.woodshed` directory, created if needed.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
    ensure_dir(base.join(APP_DIR_NAME))
}

/// The preset-bank directory under the root, created if needed.
pub fn banks_dir() -> Result<PathBuf, AppDirError> {
    subdir("banks")
}

/// The log directory under the root, created if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    subdir("logs")
}

fn subdir(name: &str) -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_dir()?.join(name))
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}

fn config_base_dir() -> Option<PathBuf> {
    let overridden = CONFIG_BASE_OVERRIDE
        .lock()
        .ok()
        .and_then(|guard| guard.clone());
    if overridden.is_some() {
        return overridden;
    }
    match std::env::var("WOODSHED_CONFIG_HOME") {
        Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct OverrideGuard;

    impl OverrideGuard {
        fn set(path: PathBuf) -> Self {
            *CONFIG_BASE_OVERRIDE.lock().unwrap() = Some(path);
            Self
        }
    }

    impl Drop for OverrideGuard {
        fn drop(&mut self) {
            *CONFIG_BASE_OVERRIDE.lock().unwrap() = None;
        }
    }

    #[test]
    fn banks_and_logs_nest_under_the_root() {
        let base = tempdir().unwrap();
        let _guard = OverrideGuard::set(base.path().to_path_buf());
        let root = app_root_dir().unwrap();
        assert_eq!(root, base.path().join(APP_DIR_NAME));
        assert_eq!(banks_dir().unwrap(), root.join("banks"));
        assert_eq!(logs_dir().unwrap(), root.join("logs"));
        assert!(root.join("banks").is_dir());
    }
}
