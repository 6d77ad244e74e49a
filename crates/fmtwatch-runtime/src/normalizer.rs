use crate::shutdown::ShutdownToken;
use fmtwatch_types::{ChangeKind, Message, RawEvent};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How often an idle normalizer thread looks at the shutdown token.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Distinct file paths in a batch that carry a content or identity change,
/// sorted. Directory events and attribute-only changes are dropped.
pub fn normalize_batch(batch: &[RawEvent]) -> Vec<PathBuf> {
    batch
        .iter()
        .filter(|event| event.is_file && event.carries_content_change())
        .map(|event| event.path.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Maps one notify event onto the watch boundary's flag model. Rename events
/// carrying both paths yield one raw event per path.
pub fn raw_events_from_notify(event: &Event) -> Vec<RawEvent> {
    let (kind, is_file) = match event.kind {
        EventKind::Create(CreateKind::File) => (Some(ChangeKind::Created), Some(true)),
        EventKind::Create(CreateKind::Folder) => (Some(ChangeKind::Created), Some(false)),
        EventKind::Create(_) => (Some(ChangeKind::Created), None),
        EventKind::Modify(ModifyKind::Metadata(_)) => (Some(ChangeKind::AttributeOnly), None),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            (Some(ChangeKind::MovedFrom), None)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => (Some(ChangeKind::MovedTo), None),
        EventKind::Modify(ModifyKind::Name(_)) => (Some(ChangeKind::Renamed), None),
        EventKind::Modify(_) => (Some(ChangeKind::Updated), None),
        EventKind::Remove(RemoveKind::File) => (Some(ChangeKind::Removed), Some(true)),
        EventKind::Remove(RemoveKind::Folder) => (Some(ChangeKind::Removed), Some(false)),
        EventKind::Remove(_) => (Some(ChangeKind::Removed), None),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => (None, None),
    };
    let overflow = event.need_rescan().then_some(ChangeKind::Overflow);

    event
        .paths
        .iter()
        .map(|path| RawEvent {
            path: path.clone(),
            // Vanished paths count as files so deletions reach the coordinator.
            is_file: is_file.unwrap_or_else(|| !path.is_dir()),
            kinds: kind.into_iter().chain(overflow).collect(),
        })
        .collect()
}

/// Turns raw watcher batches into one `FileChanged` message per distinct path.
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    inbox: Sender<Message>,
}

impl EventNormalizer {
    pub fn new(inbox: Sender<Message>) -> Self {
        Self { inbox }
    }

    /// Normalizes and enqueues a batch. Returns how many paths were forwarded,
    /// or `None` once the inbox is closed.
    pub fn forward(&self, batch: &[RawEvent]) -> Option<usize> {
        let paths = normalize_batch(batch);
        let count = paths.len();
        for path in paths {
            self.inbox.send(Message::FileChanged(path)).ok()?;
        }
        Some(count)
    }

    /// Runs the normalizer on its own thread, gathering everything that
    /// arrives within `batch_window` of the first event into one batch.
    pub fn spawn(
        self,
        raw: Receiver<notify::Result<Event>>,
        batch_window: Duration,
        shutdown: ShutdownToken,
    ) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("fmtwatch-normalizer".to_string())
            .spawn(move || self.run(&raw, batch_window, &shutdown))
    }

    fn run(
        &self,
        raw: &Receiver<notify::Result<Event>>,
        batch_window: Duration,
        shutdown: &ShutdownToken,
    ) {
        while !shutdown.is_cancelled() {
            let first = match raw.recv_timeout(IDLE_POLL) {
                Ok(first) => first,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let mut batch = Vec::new();
            collect(first, &mut batch);

            let deadline = Instant::now() + batch_window;
            let mut disconnected = false;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match raw.recv_timeout(remaining) {
                    Ok(next) => collect(next, &mut batch),
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }

            match self.forward(&batch) {
                Some(count) if count > 0 => {
                    tracing::debug!(
                        "Forwarded {} changed paths from {} raw events",
                        count,
                        batch.len()
                    );
                }
                Some(_) => {}
                None => break,
            }
            if disconnected {
                break;
            }
        }

        tracing::debug!("Event normalizer stopped");
    }
}

fn collect(result: notify::Result<Event>, batch: &mut Vec<RawEvent>) {
    match result {
        Ok(event) => batch.extend(raw_events_from_notify(&event)),
        Err(e) => tracing::warn!("Filesystem watcher error: {}", e),
    }
}
