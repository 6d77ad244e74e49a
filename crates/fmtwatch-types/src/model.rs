use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Last classification decision recorded for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Verified compliant as of this mtime.
    Formatted(SystemTime),
    /// Observed non-compliant at this mtime.
    Pending(SystemTime),
}

/// FormattedAt and PendingSince. A path lives in at most one of the two maps;
/// every mutator preserves that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatModel {
    formatted_at: HashMap<PathBuf, SystemTime>,
    pending_since: HashMap<PathBuf, SystemTime>,
}

impl FormatModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classification(&self, path: &Path) -> Option<Classification> {
        if let Some(at) = self.formatted_at.get(path) {
            return Some(Classification::Formatted(*at));
        }
        self.pending_since
            .get(path)
            .map(|since| Classification::Pending(*since))
    }

    pub fn formatted_at(&self, path: &Path) -> Option<SystemTime> {
        self.formatted_at.get(path).copied()
    }

    pub fn pending_since(&self, path: &Path) -> Option<SystemTime> {
        self.pending_since.get(path).copied()
    }

    pub fn mark_formatted(&mut self, path: PathBuf, at: SystemTime) {
        self.pending_since.remove(&path);
        self.formatted_at.insert(path, at);
    }

    /// Returns true when the path was not already pending at `since`.
    pub fn mark_pending(&mut self, path: PathBuf, since: SystemTime) -> bool {
        self.formatted_at.remove(&path);
        self.pending_since.insert(path, since) != Some(since)
    }

    /// Moves a formatted path's timestamp. No-op (returns false) for any
    /// path that is not currently formatted.
    pub fn refresh_formatted(&mut self, path: &Path, at: SystemTime) -> bool {
        match self.formatted_at.get_mut(path) {
            Some(stored) => {
                *stored = at;
                true
            }
            None => false,
        }
    }

    /// Drops every record of the path. Returns true if anything was removed.
    pub fn forget(&mut self, path: &Path) -> bool {
        let formatted = self.formatted_at.remove(path).is_some();
        let pending = self.pending_since.remove(path).is_some();
        formatted || pending
    }

    /// Pending paths in sorted order.
    pub fn pending_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.pending_since.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn pending_len(&self) -> usize {
        self.pending_since.len()
    }

    pub fn formatted_len(&self) -> usize {
        self.formatted_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatted_at.is_empty() && self.pending_since.is_empty()
    }

    pub fn snapshot(&self, roots: &[PathBuf]) -> Snapshot {
        let pending = self
            .pending_since
            .iter()
            .map(|(path, at)| SnapshotEntry::new(path, *at, EntryState::Pending));
        let formatted = self
            .formatted_at
            .iter()
            .map(|(path, at)| SnapshotEntry::new(path, *at, EntryState::Formatted));

        let mut entries: Vec<SnapshotEntry> = pending.chain(formatted).collect();
        entries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.path.cmp(&b.path))
        });

        Snapshot {
            roots: roots.to_vec(),
            entries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Pending,
    Formatted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub path: PathBuf,
    pub timestamp: SystemTime,
    pub state: EntryState,
}

impl SnapshotEntry {
    fn new(path: &Path, timestamp: SystemTime, state: EntryState) -> Self {
        Self {
            path: path.to_path_buf(),
            timestamp,
            state,
        }
    }
}

/// Immutable copy of the model handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub roots: Vec<PathBuf>,
    /// Pending and formatted entries together, newest first.
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub fn pending(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.state == EntryState::Pending)
    }

    pub fn formatted(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.state == EntryState::Formatted)
    }

    pub fn get(&self, path: &Path) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|entry| entry.path == path)
    }
}
