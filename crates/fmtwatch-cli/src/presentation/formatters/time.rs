use chrono::{DateTime, Utc};
use std::time::{Duration, SystemTime};

/// Compact age such as "340 ms", "12 sec" or "3 days". Timestamps in the
/// future count as zero.
pub fn ago_text(now: SystemTime, then: SystemTime) -> String {
    let elapsed = now.duration_since(then).unwrap_or(Duration::ZERO);
    format_age(elapsed)
}

fn format_age(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let seconds = elapsed.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 1 {
        format!("{} ms", millis)
    } else if minutes < 1 {
        format!("{} sec", seconds)
    } else if hours < 1 {
        format!("{} min", minutes)
    } else if days < 1 {
        format!("{} hrs", hours)
    } else {
        format!("{} days", days)
    }
}

pub fn rfc3339(at: SystemTime) -> String {
    DateTime::<Utc>::from(at).to_rfc3339()
}
