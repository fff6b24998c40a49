//! Most-recently-used catalog file list.
//!
//! # Invariants
//! - The most recent file is always first.
//! - A path appears at most once; re-touching moves it to the front.
//! - The list never exceeds [`MRU_CAP`] entries.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum number of entries kept in the list.
pub const MRU_CAP: usize = 10;

/// Ordered list of recently opened catalog files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MruList {
    items: Vec<PathBuf>,
}

impl MruList {
    /// Records one file as most recently used.
    pub fn touch(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.items.retain(|item| *item != path);
        self.items.insert(0, path);
        self.items.truncate(MRU_CAP);
    }

    /// Returns entries, most recent first.
    pub fn items(&self) -> &[PathBuf] {
        &self.items
    }

    /// Returns the most recent entry, if any.
    pub fn latest(&self) -> Option<&Path> {
        self.items.first().map(PathBuf::as_path)
    }

    /// Returns whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops entries whose files no longer exist, returning how many were
    /// removed.
    pub fn remove_missing(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.exists());
        before - self.items.len()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
