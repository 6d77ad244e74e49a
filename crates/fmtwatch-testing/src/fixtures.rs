//! Sample sources and a stand-in formatter.
//!
//! The fake formatting rule is shared by [`crate::FakeGateway`] and the shell
//! script below: a file is compliant unless it contains a tab, and applying
//! replaces every tab with four spaces.

#[cfg(unix)]
use std::path::{Path, PathBuf};

pub const FORMATTED_SOURCE: &str = "int main() {\n    return 0;\n}\n";
pub const UNFORMATTED_SOURCE: &str = "int main() {\n\treturn 0;\n}\n";

pub const FAKE_VERSION_LINE: &str = "clang-format version 17.0.6 (fake)";

pub fn is_compliant(content: &str) -> bool {
    !content.contains('\t')
}

pub fn format_source(content: &str) -> String {
    content.replace('\t', "    ")
}

/// Writes an executable `clang-format` stand-in into `dir` and returns its
/// path. Put `dir` first on `PATH` to make the real gateway find it.
#[cfg(unix)]
pub fn write_fake_clang_format(dir: &Path) -> std::io::Result<PathBuf> {
    write_script(dir, "clang-format", &fake_clang_format_script())
}

/// A stand-in whose `--version` prints the given stdout and exits with `code`.
#[cfg(unix)]
pub fn write_version_script(
    dir: &Path,
    name: &str,
    stdout: &str,
    code: i32,
) -> std::io::Result<PathBuf> {
    let body = format!("#!/bin/sh\nprintf '%s' '{}'\nexit {}\n", stdout, code);
    write_script(dir, name, &body)
}

#[cfg(unix)]
fn fake_clang_format_script() -> String {
    format!(
        r#"#!/bin/sh
mode=""
file=""
for arg in "$@"; do
    case "$arg" in
        --version) echo "{version}"; exit 0 ;;
        --dry-run) mode="check" ;;
        -i) mode="apply" ;;
        -*) ;;
        *) file="$arg" ;;
    esac
done
[ -f "$file" ] || exit 1
tab=$(printf '\t')
case "$mode" in
    check)
        if grep -q "$tab" "$file"; then exit 1; fi
        exit 0 ;;
    apply)
        sed "s/$tab/    /g" "$file" > "$file.fmt" && mv "$file.fmt" "$file"
        exit $? ;;
esac
exit 2
"#,
        version = FAKE_VERSION_LINE
    )
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, body)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}
