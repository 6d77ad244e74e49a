//! The single owner of the format-state model.
//!
//! Everything that changes FormattedAt/PendingSince goes through
//! [`StateCoordinator::handle`], on one thread. Other threads only talk to it
//! through the inbound queue, and it only talks to the worker through the
//! request queue. Each decision re-reads the file's existence and mtime, so the
//! result is correct under any interleaving of producers.

use crate::config::TouchPolicy;
use crate::fs;
use crate::shutdown::ShutdownToken;
use fmtwatch_types::{
    FormatCompletion, FormatModel, FormatRequest, Message, Notice, Snapshot, WatchSet,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::SystemTime;

/// Upper bound on messages handled per drain, so one burst cannot starve the
/// presentation loop sharing this thread.
const MAX_MESSAGES_PER_DRAIN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    QueueWasEmpty,
    Processed(usize),
    ShouldExit,
}

pub struct StateCoordinator {
    watch_set: WatchSet,
    model: FormatModel,
    /// Newest outstanding check per path, keyed to its captured mtime.
    checks_in_flight: HashMap<PathBuf, SystemTime>,
    requests: Option<Sender<FormatRequest>>,
    notices: Vec<Notice>,
    touch_policy: TouchPolicy,
    auto_format: bool,
}

impl StateCoordinator {
    pub fn new(watch_set: WatchSet, requests: Sender<FormatRequest>) -> Self {
        Self {
            watch_set,
            model: FormatModel::new(),
            checks_in_flight: HashMap::new(),
            requests: Some(requests),
            notices: Vec::new(),
            touch_policy: TouchPolicy::default(),
            auto_format: false,
        }
    }

    pub fn with_touch_policy(mut self, touch_policy: TouchPolicy) -> Self {
        self.touch_policy = touch_policy;
        self
    }

    pub fn with_auto_format(mut self, auto_format: bool) -> Self {
        self.auto_format = auto_format;
        self
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    pub fn model(&self) -> &FormatModel {
        &self.model
    }

    pub fn auto_format(&self) -> bool {
        self.auto_format
    }

    pub fn snapshot(&self) -> Snapshot {
        self.model.snapshot(self.watch_set.roots())
    }

    /// Notices emitted since the last call, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Drops the request sender. Nothing is issued afterwards and the worker
    /// sees its queue disconnect once it has drained what was already sent.
    pub fn stop_issuing(&mut self) {
        self.requests = None;
    }

    /// Handles whatever is queued right now without ever blocking.
    pub fn drain(&mut self, inbox: &Receiver<Message>, shutdown: &ShutdownToken) -> DrainOutcome {
        let mut processed = 0;

        while processed < MAX_MESSAGES_PER_DRAIN {
            if shutdown.is_cancelled() {
                return DrainOutcome::ShouldExit;
            }
            match inbox.try_recv() {
                Ok(message) => {
                    self.handle(message);
                    processed += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if processed == 0 {
            DrainOutcome::QueueWasEmpty
        } else {
            DrainOutcome::Processed(processed)
        }
    }

    pub fn handle(&mut self, message: Message) {
        match message {
            Message::FileChanged(path) => self.file_changed(path),
            Message::FormatAll => self.format_all(),
            Message::FormatOne(path) => self.format_one(path),
            Message::TouchOne(path) => self.touch_one(&path),
            Message::AddAll => self.add_all(),
            Message::SetAutoFormat(enabled) => self.set_auto_format(enabled),
            Message::Completed(completion) => self.completed(completion),
        }
    }

    fn file_changed(&mut self, path: PathBuf) {
        let modified = if fs::exists(&path) {
            fs::modified(&path)
        } else {
            None
        };
        let Some(modified) = modified else {
            // A later restore may carry the same mtime and must be re-checked.
            self.checks_in_flight.remove(&path);
            if self.model.forget(&path) {
                tracing::debug!("{} is gone, no longer tracked", path.display());
            }
            return;
        };

        if !self.watch_set.is_trackable(&path) {
            return;
        }

        if self.model.formatted_at(&path) == Some(modified) {
            return;
        }
        if self.checks_in_flight.get(&path) == Some(&modified) {
            return;
        }

        tracing::debug!("Checking {}", path.display());
        self.checks_in_flight.insert(path.clone(), modified);
        self.issue(FormatRequest::Check {
            path,
            captured: modified,
        });
    }

    fn completed(&mut self, completion: FormatCompletion) {
        match completion.request {
            FormatRequest::Check { path, captured } => {
                self.check_completed(path, captured, completion.success)
            }
            FormatRequest::Apply { path } => self.apply_completed(path, completion.success),
        }
    }

    fn check_completed(&mut self, path: PathBuf, captured: SystemTime, compliant: bool) {
        if self.checks_in_flight.get(&path) == Some(&captured) {
            self.checks_in_flight.remove(&path);
        }

        if !fs::exists(&path) {
            self.model.forget(&path);
            return;
        }

        if compliant {
            tracing::debug!("{} is formatted", path.display());
            self.model.mark_formatted(path, captured);
            return;
        }

        if self.model.mark_pending(path.clone(), captured) {
            tracing::debug!("{} needs formatting", path.display());
            self.notices.push(Notice::Pending {
                path,
                since: captured,
            });
        }
    }

    fn apply_completed(&mut self, path: PathBuf, success: bool) {
        if !success {
            tracing::warn!("ERROR formatting {}", path.display());
            self.notices.push(Notice::FormatFailed { path });
            return;
        }

        // The apply itself just moved the mtime; "now" covers a failed read.
        let at = fs::modified(&path).unwrap_or_else(SystemTime::now);
        tracing::info!("Formatted {}", path.display());
        self.model.mark_formatted(path.clone(), at);
        self.notices.push(Notice::Formatted { path });
    }

    fn format_all(&mut self) {
        for path in self.model.pending_paths() {
            self.issue(FormatRequest::Apply { path });
        }
    }

    fn format_one(&mut self, path: PathBuf) {
        if !self.watch_set.is_trackable(&path) {
            tracing::debug!("Not formatting {}: extension not tracked", path.display());
            return;
        }
        self.issue(FormatRequest::Apply { path });
    }

    fn touch_one(&mut self, path: &Path) {
        if self.model.formatted_at(path).is_none() {
            match self.touch_policy {
                TouchPolicy::Ignore => {
                    tracing::debug!("Ignoring touch of {}: not formatted", path.display());
                }
                TouchPolicy::Reject => {
                    tracing::warn!("Refusing to touch {}: not formatted", path.display());
                    self.notices.push(Notice::TouchRejected {
                        path: path.to_path_buf(),
                    });
                }
            }
            return;
        }

        match fs::touch(path) {
            Ok(at) => {
                self.model.refresh_formatted(path, at);
            }
            Err(e) => tracing::warn!("Failed to touch {}: {}", path.display(), e),
        }
    }

    fn add_all(&mut self) {
        let files = fs::enumerate_files(self.watch_set.roots());
        tracing::info!("Adding {} files under watched roots", files.len());
        for path in files {
            self.file_changed(path);
        }
    }

    fn set_auto_format(&mut self, enabled: bool) {
        let was_enabled = std::mem::replace(&mut self.auto_format, enabled);
        if enabled && !was_enabled {
            self.format_all();
        }
    }

    fn issue(&mut self, request: FormatRequest) {
        let Some(requests) = &self.requests else {
            tracing::debug!("Shutting down, dropped request for {}", request.path().display());
            return;
        };
        if let Err(e) = requests.send(request) {
            tracing::warn!("Format worker is gone, dropped request for {}", e.0.path().display());
            self.requests = None;
        }
    }
}
