use crate::presentation::renderers::ConsoleRenderer;
use crate::types::OutputFormat;
use anyhow::Result;
use fmtwatch_runtime::{DrainOutcome, Runtime};
use std::time::Duration;

const WAIT: Duration = Duration::from_millis(250);

/// Streams notices to stdout until the shutdown token is cancelled.
pub fn run(runtime: &mut Runtime, format: OutputFormat) -> Result<()> {
    let mut renderer = ConsoleRenderer::stdout(format);
    renderer.banner(runtime.coordinator().watch_set().roots())?;

    loop {
        let outcome = runtime.wait(WAIT);

        for notice in runtime.take_notices() {
            renderer.notice(&notice)?;
        }

        if outcome == DrainOutcome::ShouldExit {
            break;
        }
        if runtime.worker_finished() && !runtime.shutdown_token().is_cancelled() {
            anyhow::bail!("Format worker stopped unexpectedly");
        }
    }

    Ok(())
}
