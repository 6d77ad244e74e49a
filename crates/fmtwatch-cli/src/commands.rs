use super::args::{Cli, Commands, ConfigCommand, WatchArgs};
use super::handlers;
use crate::logging;
use crate::types::UiMode;
use anyhow::Result;
use fmtwatch_runtime::Config;
use is_terminal::IsTerminal;

pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Watch(args) => {
            let ui = args.ui.unwrap_or_else(default_ui);
            logging::init(cli.log_level, cli.log_file.as_deref(), ui == UiMode::Console)?;

            let mut config = Config::load(config_path)?;
            apply_overrides(&mut config, &args);
            handlers::watch::handle(&config, &args, ui)
        }

        Commands::Doctor { formatter } => {
            logging::init(cli.log_level, cli.log_file.as_deref(), true)?;
            let mut config = Config::load(config_path)?;
            if let Some(program) = formatter {
                config.formatter.program = program;
            }
            handlers::doctor::handle(&config)
        }

        Commands::Config { command } => match command {
            ConfigCommand::Init { force } => handlers::config::init(config_path, force),
            ConfigCommand::Show => handlers::config::show(config_path),
        },
    }
}

fn default_ui() -> UiMode {
    if std::io::stdout().is_terminal() {
        UiMode::Tui
    } else {
        UiMode::Console
    }
}

fn apply_overrides(config: &mut Config, args: &WatchArgs) {
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }
    if let Some(program) = &args.formatter {
        config.formatter.program = program.clone();
    }
    if args.auto_format {
        config.auto_format = true;
    }
    if let Some(policy) = args.touch_policy {
        config.touch_policy = policy.into();
    }
    if args.poll_interval_ms.is_some() {
        config.watcher.poll_interval_ms = args.poll_interval_ms;
    }
}
