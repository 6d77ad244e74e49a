use crate::args::WatchArgs;
use crate::presentation::renderers::tui::TuiRenderer;
use crate::types::UiMode;
use anyhow::Result;
use fmtwatch_runtime::{ClangFormat, Config, Runtime, ShutdownToken};
use fmtwatch_types::Message;

/// Probes the formatter, starts the pipeline and hands the coordinator
/// thread to the chosen front end. The formatter is probed before any
/// watching starts; a failed probe ends the program.
pub fn handle(config: &Config, args: &WatchArgs, ui: UiMode) -> Result<()> {
    let gateway = ClangFormat::probe(&config.formatter)?;
    tracing::info!(
        "fmtwatch {} using {}",
        env!("CARGO_PKG_VERSION"),
        gateway.version()
    );

    let shutdown = ShutdownToken::new();
    let token = shutdown.clone();
    ctrlc::set_handler(move || token.cancel())?;

    let mut runtime = Runtime::start(&args.paths, config, Box::new(gateway), shutdown)?;
    if args.add_all {
        runtime.send(Message::AddAll);
    }

    let result = match ui {
        UiMode::Tui => TuiRenderer::run(&mut runtime),
        UiMode::Console => super::watch_console::run(&mut runtime, args.format),
    };

    let stopped = runtime.shutdown();
    tracing::info!("Stopped watching");
    result?;
    stopped?;
    Ok(())
}
