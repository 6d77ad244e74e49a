use crate::presentation::formatters::rfc3339;
use crate::types::OutputFormat;
use fmtwatch_types::Notice;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

/// One JSON object per line on stdout.
#[derive(Debug, Serialize)]
pub struct NoticeLine<'a> {
    pub timestamp: String,
    pub event: &'static str,
    pub path: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

impl<'a> NoticeLine<'a> {
    pub fn new(notice: &'a Notice, now: SystemTime) -> Self {
        let (event, since) = match notice {
            Notice::Pending { since, .. } => ("pending", Some(rfc3339(*since))),
            Notice::Formatted { .. } => ("formatted", None),
            Notice::FormatFailed { .. } => ("format_failed", None),
            Notice::TouchRejected { .. } => ("touch_rejected", None),
        };
        Self {
            timestamp: rfc3339(now),
            event,
            path: notice.path(),
            since,
        }
    }
}

pub struct ConsoleRenderer<W: Write> {
    format: OutputFormat,
    out: W,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, io::stdout())
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    pub fn banner(&mut self, roots: &[std::path::PathBuf]) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return Ok(());
        }
        for root in roots {
            writeln!(self.out, "Watching {}", root.display().bold())?;
        }
        writeln!(self.out, "fmtwatch is running, CTRL-C to exit...")?;
        self.out.flush()
    }

    pub fn notice(&mut self, notice: &Notice) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let line = NoticeLine::new(notice, SystemTime::now());
                let json = serde_json::to_string(&line).map_err(io::Error::other)?;
                writeln!(self.out, "{}", json)?;
            }
            OutputFormat::Plain => {
                let text = notice.to_string();
                match notice {
                    Notice::Formatted { .. } => writeln!(self.out, "{}", text.green())?,
                    Notice::Pending { .. } => writeln!(self.out, "{}", text.yellow())?,
                    Notice::FormatFailed { .. } | Notice::TouchRejected { .. } => {
                        writeln!(self.out, "{}", text.red())?
                    }
                }
            }
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
