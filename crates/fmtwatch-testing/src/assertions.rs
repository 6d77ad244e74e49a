//! Polling and output assertions.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};

/// Re-evaluates `cond` every few milliseconds until it holds or `timeout`
/// passes. Returns whether it held.
pub fn eventually<F>(timeout: Duration, mut cond: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// Assert that a console JSON line is the given notice for the given path.
pub fn assert_notice_line(line: &str, event: &str, path: &Path) -> Result<()> {
    let json: Value = serde_json::from_str(line).context("Expected a JSON notice line")?;

    let actual_event = json["event"]
        .as_str()
        .context("Notice line missing 'event'")?;
    if actual_event != event {
        anyhow::bail!("Expected event {} but got {}", event, actual_event);
    }

    let actual_path = json["path"].as_str().context("Notice line missing 'path'")?;
    if Path::new(actual_path) != path {
        anyhow::bail!(
            "Expected path {} but got {}",
            path.display(),
            actual_path
        );
    }

    if json["timestamp"].as_str().is_none() {
        anyhow::bail!("Notice line missing 'timestamp'");
    }

    Ok(())
}
