//! TestWorld pattern for declarative integration test setup.
//!
//! Provides a fluent interface for:
//! - Creating an isolated source tree under a temp dir
//! - Writing sources with pinned modification times
//! - Pointing the CLI at a private config file and a fake formatter

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use fmtwatch_testing::TestWorld;
/// use fmtwatch_testing::fixtures::UNFORMATTED_SOURCE;
///
/// let world = TestWorld::new();
/// let path = world.write_source("src/main.cpp", UNFORMATTED_SOURCE).unwrap();
/// world.set_mtime_secs(&path, 100).unwrap();
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    root: PathBuf,
    bin_dir: PathBuf,
    config_path: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment with an empty `src` root.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        // Canonical so paths match what the runtime reports (macOS /private).
        let base = std::fs::canonicalize(temp_dir.path()).expect("Failed to canonicalize temp dir");
        let root = base.join("src");
        let bin_dir = base.join("bin");
        let config_path = base.join("config.toml");

        std::fs::create_dir_all(&root).expect("Failed to create source root");
        std::fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");

        Self {
            temp_dir,
            root,
            bin_dir,
            config_path,
            env_vars: HashMap::new(),
        }
    }

    /// The watched source root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Install the stand-in `clang-format` into the world's bin dir.
    #[cfg(unix)]
    pub fn with_fake_formatter(self) -> Self {
        crate::fixtures::write_fake_clang_format(&self.bin_dir)
            .expect("Failed to write fake clang-format");
        self
    }

    /// Write the config file the CLI will be pointed at.
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(&self.config_path, toml).expect("Failed to write config");
        self
    }

    /// Write a file relative to the source root, creating parent dirs.
    pub fn write_source(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Pin a file's mtime to `UNIX_EPOCH + secs` and return that time.
    pub fn set_mtime_secs(&self, path: &Path, secs: u64) -> Result<SystemTime> {
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        filetime::set_file_mtime(path, filetime::FileTime::from_system_time(at))?;
        Ok(at)
    }

    pub fn read(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Configure a CLI command with this world's config file, a `PATH` that
    /// prefers the bin dir, and any extra env vars.
    ///
    /// The caller must provide the base command (e.g. from `cargo_bin_cmd!("fmtwatch")`).
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--config").arg(&self.config_path);
        cmd.current_dir(self.temp_dir.path());
        cmd.env("PATH", self.search_path());
        cmd.env_remove("FMTWATCH_CONFIG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Same settings as [`Self::configure_command`] for a plain
    /// `std::process::Command`, used with background processes.
    pub fn configure_std_command<'a>(
        &self,
        cmd: &'a mut std::process::Command,
    ) -> &'a mut std::process::Command {
        cmd.arg("--config").arg(&self.config_path);
        cmd.current_dir(self.temp_dir.path());
        cmd.env("PATH", self.search_path());
        cmd.env_remove("FMTWATCH_CONFIG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    fn search_path(&self) -> std::ffi::OsString {
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![self.bin_dir.clone()];
        paths.extend(std::env::split_paths(&inherited));
        std::env::join_paths(paths).expect("Failed to build PATH")
    }
}
