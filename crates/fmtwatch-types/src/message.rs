use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Everything the state coordinator consumes, from any producer.
///
/// Filesystem events, user intents and worker completions all travel through
/// one inbound queue so the coordinator sees them in a single ordered stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A normalized change notification for a single path.
    FileChanged(PathBuf),
    /// Apply the formatter to every pending path.
    FormatAll,
    /// Apply the formatter to one path, whatever its classification.
    FormatOne(PathBuf),
    /// Bump a formatted file's mtime to now.
    TouchOne(PathBuf),
    /// Enumerate every file under the watch roots and treat each as changed.
    AddAll,
    SetAutoFormat(bool),
    Completed(FormatCompletion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Check,
    Apply,
}

/// Work item for the format worker. Plain data, no callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatRequest {
    /// Non-mutating compliance check. `captured` is the mtime observed when
    /// the check was issued.
    Check { path: PathBuf, captured: SystemTime },
    /// In-place format.
    Apply { path: PathBuf },
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Check => write!(f, "check"),
            OperationKind::Apply => write!(f, "apply"),
        }
    }
}

impl FormatRequest {
    pub fn path(&self) -> &Path {
        match self {
            FormatRequest::Check { path, .. } | FormatRequest::Apply { path } => path,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            FormatRequest::Check { .. } => OperationKind::Check,
            FormatRequest::Apply { .. } => OperationKind::Apply,
        }
    }
}

/// Result of one executed request, posted back by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCompletion {
    pub request: FormatRequest,
    /// For checks: the file is compliant. For applies: the formatter exited 0.
    pub success: bool,
}

/// User-visible outcome of a state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notice {
    Pending { path: PathBuf, since: SystemTime },
    Formatted { path: PathBuf },
    FormatFailed { path: PathBuf },
    TouchRejected { path: PathBuf },
}

impl Notice {
    pub fn path(&self) -> &Path {
        match self {
            Notice::Pending { path, .. }
            | Notice::Formatted { path }
            | Notice::FormatFailed { path }
            | Notice::TouchRejected { path } => path,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::FormatFailed { .. } | Notice::TouchRejected { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Pending { path, .. } => write!(f, "Needs formatting {}", path.display()),
            Notice::Formatted { path } => write!(f, "Formatted {}", path.display()),
            Notice::FormatFailed { path } => write!(f, "ERROR formatting {}", path.display()),
            Notice::TouchRejected { path } => {
                write!(f, "ERROR touching {}: file is not formatted", path.display())
            }
        }
    }
}
