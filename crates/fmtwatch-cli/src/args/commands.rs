use crate::types::{OutputFormat, TouchPolicyArg, UiMode};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Watch directories and track which files need formatting")]
    Watch(WatchArgs),

    #[command(about = "Locate the formatter and report its version")]
    Doctor {
        #[arg(long, help = "Formatter program to probe instead of the configured one")]
        formatter: Option<String>,
    },

    #[command(about = "Manage the config file")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    /// Directories to watch recursively
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Dashboard or streaming output (default: tui on a terminal)
    #[arg(long)]
    pub ui: Option<UiMode>,

    /// Console output style
    #[arg(long, default_value = "plain")]
    pub format: OutputFormat,

    /// Check every existing file under the roots at startup
    #[arg(long)]
    pub add_all: bool,

    /// Tracked extensions, replacing the configured list
    #[arg(long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Formatter program name or path
    #[arg(long)]
    pub formatter: Option<String>,

    /// Format every pending file whenever the terminal regains focus
    #[arg(long)]
    pub auto_format: bool,

    /// What touching an unformatted file does
    #[arg(long)]
    pub touch_policy: Option<TouchPolicyArg>,

    /// Poll the filesystem at this interval instead of native notifications
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Write the default config file")]
    Init {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },

    #[command(about = "Print the effective config as TOML")]
    Show,
}
