use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Change flags reported by the filesystem watcher for a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Removed,
    Renamed,
    MovedFrom,
    MovedTo,
    /// Permissions, ownership or timestamps only. Contents untouched.
    AttributeOnly,
    /// The watcher dropped events and the caller should rescan.
    Overflow,
}

impl ChangeKind {
    /// Whether this flag can mean the file's contents or identity changed.
    pub fn is_content_change(self) -> bool {
        matches!(
            self,
            ChangeKind::Created
                | ChangeKind::Updated
                | ChangeKind::Removed
                | ChangeKind::Renamed
                | ChangeKind::MovedFrom
                | ChangeKind::MovedTo
        )
    }
}

/// One raw notification as delivered by the watch backend, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub path: PathBuf,
    pub is_file: bool,
    pub kinds: Vec<ChangeKind>,
}

impl RawEvent {
    pub fn file(path: impl Into<PathBuf>, kinds: impl IntoIterator<Item = ChangeKind>) -> Self {
        Self {
            path: path.into(),
            is_file: true,
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn dir(path: impl Into<PathBuf>, kinds: impl IntoIterator<Item = ChangeKind>) -> Self {
        Self {
            path: path.into(),
            is_file: false,
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn carries_content_change(&self) -> bool {
        self.kinds.iter().any(|kind| kind.is_content_change())
    }
}
