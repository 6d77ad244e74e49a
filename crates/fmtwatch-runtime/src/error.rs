use std::path::PathBuf;
use thiserror::Error;

/// Result type for fmtwatch-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug, Error)]
pub enum Error {
    /// The formatter could not be located or failed its version query
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// A watch root does not exist or is not a directory
    #[error("Path {} {reason}", .path.display())]
    InvalidWatchRoot { path: PathBuf, reason: String },

    #[error("No path specified")]
    NoWatchRoots,

    /// Filesystem watcher setup failed
    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Format worker panicked")]
    WorkerPanicked,
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Why the formatter probe failed. Fatal at startup.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{program} not found on PATH")]
    NotFound { program: String },

    #[error("Failed to run `{program} --version`, reason: {source}{hint}")]
    Spawn {
        program: String,
        hint: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program} --version` failed with exit code {code}\nstdout: {stdout}\nstderr: {stderr}")]
    ExitCode {
        program: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("`{program} --version` returned no output.\nstderr: {stderr}")]
    NoOutput { program: String, stderr: String },

    #[error("`{program} --version` returned more than 1 lines.\nstdout: {stdout}")]
    MultipleLines { program: String, stdout: String },
}
