use std::path::{MAIN_SEPARATOR, Path};

const ELLIPSIS: char = '…';

/// Keeps the tail of `dir` so it fits in `width` columns, marking the cut
/// with a leading ellipsis.
pub fn fit_dir(dir: &str, width: usize) -> String {
    let len = dir.chars().count();
    if len <= width {
        return dir.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let keep = width - 1;
    let tail: String = dir.chars().skip(len - keep).collect();
    format!("{}{}", ELLIPSIS, tail)
}

/// Parent directory of a root-relative path, with a trailing separator, or
/// empty for files directly under a root.
pub fn display_dir(relative: &Path) -> String {
    match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            format!("{}{}", parent.display(), MAIN_SEPARATOR)
        }
        _ => String::new(),
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_dir_keeps_short() {
        assert_eq!(fit_dir("src/", 10), "src/");
        assert_eq!(fit_dir("", 0), "");
    }

    #[test]
    fn test_fit_dir_cuts_front() {
        assert_eq!(fit_dir("very/long/path/", 8), "…g/path/");
        assert_eq!(fit_dir("abc", 1), "…");
        assert_eq!(fit_dir("abc", 0), "");
    }

    #[test]
    fn test_fit_dir_counts_chars() {
        assert_eq!(fit_dir("ééééé/", 4), "…éé/");
    }

    #[cfg(unix)]
    #[test]
    fn test_display_dir_and_name() {
        assert_eq!(display_dir(Path::new("lib/core/a.cpp")), "lib/core/");
        assert_eq!(display_dir(Path::new("a.cpp")), "");
        assert_eq!(file_name(Path::new("lib/core/a.cpp")), "a.cpp");
    }
}
