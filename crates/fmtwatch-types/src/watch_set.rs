use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extensions tracked when no configuration overrides them.
pub const DEFAULT_EXTENSIONS: &[&str] = &["cpp", "cxx", "c", "m", "mm", "h", "hpp", "hxx"];

/// Watched roots plus the extension filter. Fixed after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSet {
    roots: Vec<PathBuf>,
    extensions: BTreeSet<String>,
}

impl WatchSet {
    /// Extensions may be given with or without the leading dot.
    pub fn new<I, S>(roots: Vec<PathBuf>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { roots, extensions }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Whether the path's extension is one we format.
    pub fn is_trackable(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.contains(ext))
    }

    /// Shortest form of `path` relative to any root, or the path itself when
    /// it lives outside every root.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        self.roots
            .iter()
            .filter_map(|root| path.strip_prefix(root).ok())
            .min_by_key(|rel| rel.as_os_str().len())
            .unwrap_or(path)
    }
}
