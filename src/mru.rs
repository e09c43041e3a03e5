//! Bounded most-recently-used list of opened files.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::atomic_file::write_atomic;

/// Default entry capacity when the settings carry no override.
pub const DEFAULT_CAPACITY: usize = 8;

/// Errors that may occur while loading or saving the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Failed to read the ledger file.
    #[error("Failed to read recent files list {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to write the ledger file.
    #[error("Failed to write recent files list {path}: {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Ordered recent-files list, most recent first, without duplicates.
#[derive(Clone, Debug)]
pub struct RecentFilesLedger {
    entries: Vec<PathBuf>,
    capacity: usize,
}

impl RecentFilesLedger {
    /// An empty ledger bounded to `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Load a ledger from its flat file, one absolute path per line.
    ///
    /// A missing file yields an empty ledger. Entries beyond the capacity
    /// are truncated away.
    pub fn load(path: &Path, capacity: usize) -> Result<Self, LedgerError> {
        let mut ledger = Self::new(capacity);
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(ledger),
            Err(source) => {
                return Err(LedgerError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        ledger.entries = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(ledger.capacity)
            .map(PathBuf::from)
            .collect();
        Ok(ledger)
    }

    /// Persist the ledger, most recent first, one path per line.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let mut text = String::new();
        for entry in &self.entries {
            text.push_str(&entry.to_string_lossy());
            text.push('\n');
        }
        write_atomic(path, text.as_bytes()).map_err(|source| LedgerError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Promote `path` to the front, dropping the oldest entry on overflow.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.entries.retain(|entry| entry != &path);
        self.entries.insert(0, path);
        self.entries.truncate(self.capacity);
    }

    /// Remove `path` if present; a no-op otherwise.
    ///
    /// Used when a recalled entry fails to open.
    pub fn remove(&mut self, path: &Path) {
        self.entries.retain(|entry| entry != path);
    }

    /// Entries in most-recent-first order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ledger_of(paths: &[&str]) -> RecentFilesLedger {
        let mut ledger = RecentFilesLedger::new(4);
        for path in paths.iter().rev() {
            ledger.add(*path);
        }
        ledger
    }

    #[test]
    fn re_adding_the_front_entry_changes_nothing() {
        let mut ledger = ledger_of(&["/a", "/b", "/c"]);
        ledger.add("/a");
        assert_eq!(ledger.entries(), [Path::new("/a"), Path::new("/b"), Path::new("/c")]);
    }

    #[test]
    fn re_adding_a_middle_entry_promotes_it_without_duplicating() {
        let mut ledger = ledger_of(&["/a", "/b", "/c"]);
        ledger.add("/b");
        assert_eq!(ledger.entries(), [Path::new("/b"), Path::new("/a"), Path::new("/c")]);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn overflow_evicts_the_oldest_entry() {
        let mut ledger = ledger_of(&["/a", "/b", "/c", "/d"]);
        ledger.add("/e");
        assert_eq!(
            ledger.entries(),
            [Path::new("/e"), Path::new("/a"), Path::new("/b"), Path::new("/c")]
        );
    }

    #[test]
    fn remove_is_a_no_op_for_absent_entries() {
        let mut ledger = ledger_of(&["/a"]);
        ledger.remove(Path::new("/zzz"));
        assert_eq!(ledger.entries(), [Path::new("/a")]);
        ledger.remove(Path::new("/a"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn save_then_load_keeps_the_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recent.txt");
        let ledger = ledger_of(&["/songs/one.mp3", "/songs/two.wav", "/songs/three.mp3"]);
        ledger.save(&path).unwrap();
        let reloaded = RecentFilesLedger::load(&path, 4).unwrap();
        assert_eq!(reloaded.entries(), ledger.entries());
    }

    #[test]
    fn load_truncates_beyond_capacity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recent.txt");
        std::fs::write(&path, "/a\n/b\n/c\n/d\n/e\n").unwrap();
        let ledger = RecentFilesLedger::load(&path, 3).unwrap();
        assert_eq!(ledger.entries(), [Path::new("/a"), Path::new("/b"), Path::new("/c")]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let ledger = RecentFilesLedger::load(&dir.path().join("none.txt"), 8).unwrap();
        assert!(ledger.is_empty());
    }
}
