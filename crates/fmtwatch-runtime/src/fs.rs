//! Filesystem probes that never fail loudly.
//!
//! Every coordinator decision re-reads the disk through these helpers, so a
//! file that vanished between event and processing is just `None`.

use crate::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

pub fn exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}

pub fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Sets the mtime to now and returns the value the filesystem actually stored.
pub fn touch(path: &Path) -> std::io::Result<SystemTime> {
    let now = SystemTime::now();
    filetime::set_file_mtime(path, filetime::FileTime::from_system_time(now))?;
    Ok(modified(path).unwrap_or(now))
}

/// Every file under the roots, canonicalized, de-duplicated and sorted.
/// Entries that cannot be read or canonicalized are skipped.
pub fn enumerate_files(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = BTreeSet::new();

    for root in roots {
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            match std::fs::canonicalize(entry.path()) {
                Ok(canonical) => {
                    files.insert(canonical);
                }
                Err(e) => {
                    tracing::warn!(
                        "Can't convert {} to canonical path, reason: {}",
                        entry.path().display(),
                        e
                    );
                }
            }
        }
    }

    files.into_iter().collect()
}

/// Turns user-supplied roots into canonical absolute directories. Every invalid root is
/// logged; the first one is returned as the error.
pub fn resolve_roots(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if paths.is_empty() {
        return Err(Error::NoWatchRoots);
    }

    let mut roots = Vec::with_capacity(paths.len());
    let mut first_error = None;

    for path in paths {
        let absolute = std::path::absolute(path)?;
        let reason = if !exists(&absolute) {
            Some("doesn't exist.")
        } else if !absolute.is_dir() {
            Some("is not a directory.")
        } else {
            None
        };

        match reason {
            Some(reason) => {
                tracing::error!("Path {} {}", absolute.display(), reason);
                first_error.get_or_insert(Error::InvalidWatchRoot {
                    path: absolute,
                    reason: reason.to_string(),
                });
            }
            None => {
                tracing::debug!("{} -> abs -> {}", path.display(), absolute.display());
                // Canonical roots make watcher paths agree with AddAll's canonical paths.
                roots.push(std::fs::canonicalize(&absolute).unwrap_or(absolute));
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(roots),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_modified_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(modified(&temp_dir.path().join("gone.cpp")), None);
        assert!(!exists(&temp_dir.path().join("gone.cpp")));
    }

    #[test]
    fn test_enumerate_dedups_overlapping_roots() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("lib")).unwrap();
        std::fs::write(root.join("a.cpp"), "").unwrap();
        std::fs::write(root.join("lib").join("b.h"), "").unwrap();

        let files = enumerate_files(&[root.to_path_buf(), root.join("lib")]);
        assert_eq!(files.len(), 2);

        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn test_resolve_roots_rejects_files_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.cpp");
        std::fs::write(&file, "").unwrap();

        let err = resolve_roots(&[file]).unwrap_err();
        assert!(err.to_string().ends_with("is not a directory."));

        let err = resolve_roots(&[temp_dir.path().join("missing")]).unwrap_err();
        assert!(err.to_string().ends_with("doesn't exist."));

        assert!(matches!(resolve_roots(&[]), Err(Error::NoWatchRoots)));

        let roots = resolve_roots(&[temp_dir.path().to_path_buf()]).unwrap();
        assert_eq!(roots, vec![std::fs::canonicalize(temp_dir.path()).unwrap()]);
    }
}
