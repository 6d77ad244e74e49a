use crate::config::FormatterConfig;
use crate::error::ProbeError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Capability set wrapping the external formatting tool.
///
/// Calls block until the tool exits, so they belong on the worker thread.
/// Implementations must not panic: a failed spawn or a vanished file is just
/// `false`.
pub trait FormatterGateway: Send {
    fn name(&self) -> &str;

    /// True if the file already matches the formatter's output. Never writes.
    fn check(&self, path: &Path) -> bool;

    /// Formats the file in place. True on success.
    fn apply(&self, path: &Path) -> bool;
}

/// `clang-format` found on `PATH` and validated with `--version`.
#[derive(Debug, Clone)]
pub struct ClangFormat {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    version: String,
}

impl ClangFormat {
    /// Locates the tool and runs its version query. Startup refuses to
    /// continue if this fails.
    pub fn probe(config: &FormatterConfig) -> Result<Self, ProbeError> {
        let name = config.program.clone();
        let program = which::which(&config.program)
            .map_err(|_| ProbeError::NotFound {
                program: name.clone(),
            })?;
        tracing::info!("Found {}: {}", name, program.display());

        let output = Command::new(&program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProbeError::Spawn {
                program: name.clone(),
                hint: if is_exec_format_error(&source) {
                    ". Possible fix: add shebang to script."
                } else {
                    ""
                },
                source,
            })?;

        let version = version_line(
            &name,
            output.status.code(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        )?;
        tracing::info!("`{} --version`: {}", name, version);

        Ok(Self {
            name,
            program,
            args: config.args.clone(),
            version,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn run(&self, mode_args: &[&str], path: &Path) -> bool {
        let status = Command::new(&self.program)
            .args(&self.args)
            .args(mode_args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::warn!(
                    "Failed to run {} on {}: {}",
                    self.program.display(),
                    path.display(),
                    e
                );
                false
            }
        }
    }
}

impl FormatterGateway for ClangFormat {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, path: &Path) -> bool {
        self.run(&["--dry-run", "-Werror"], path)
    }

    fn apply(&self, path: &Path) -> bool {
        if !crate::fs::exists(path) {
            return false;
        }
        self.run(&["-i"], path)
    }
}

/// Exactly one non-empty line on a zero exit code is the only success.
fn version_line(
    program: &str,
    code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Result<String, ProbeError> {
    if code != Some(0) {
        return Err(ProbeError::ExitCode {
            program: program.to_string(),
            code: code.unwrap_or(-1),
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    let lines: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    match lines.as_slice() {
        [] => Err(ProbeError::NoOutput {
            program: program.to_string(),
            stderr: stderr.trim().to_string(),
        }),
        [line] => Ok(line.to_string()),
        _ => Err(ProbeError::MultipleLines {
            program: program.to_string(),
            stdout: stdout.trim().to_string(),
        }),
    }
}

#[cfg(unix)]
fn is_exec_format_error(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENOEXEC)
}

#[cfg(not(unix))]
fn is_exec_format_error(_err: &std::io::Error) -> bool {
    false
}
