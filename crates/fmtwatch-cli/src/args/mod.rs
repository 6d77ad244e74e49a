mod commands;

pub use commands::*;

use crate::types::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fmtwatch")]
#[command(about = "Watch source trees and keep them clang-formatted", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: $FMTWATCH_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Write logs here instead of stderr. The TUI discards logs without it.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
