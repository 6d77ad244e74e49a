use crate::config::Config;
use crate::coordinator::{DrainOutcome, StateCoordinator};
use crate::gateway::FormatterGateway;
use crate::normalizer::EventNormalizer;
use crate::shutdown::ShutdownToken;
use crate::worker::FormatWorker;
use crate::{Error, Result, fs};
use fmtwatch_types::{Message, Notice, Snapshot, WatchSet};
use notify::{Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::JoinHandle;
use std::time::Duration;

/// The running pipeline: watcher, normalizer thread, format worker and the
/// coordinator. The coordinator lives on whichever thread owns the `Runtime`
/// and only advances when that thread calls [`Runtime::tick`] or
/// [`Runtime::wait`].
pub struct Runtime {
    coordinator: StateCoordinator,
    inbox_tx: Sender<Message>,
    inbox_rx: Receiver<Message>,
    watcher: Option<Box<dyn Watcher + Send>>,
    normalizer: Option<JoinHandle<()>>,
    worker: Option<FormatWorker>,
    shutdown: ShutdownToken,
}

impl Runtime {
    /// Validates the roots, then starts the worker, the normalizer and the
    /// watcher in that order. The gateway must already be probed.
    pub fn start(
        paths: &[PathBuf],
        config: &Config,
        gateway: Box<dyn FormatterGateway>,
        shutdown: ShutdownToken,
    ) -> Result<Self> {
        let roots = fs::resolve_roots(paths)?;
        let watch_set = WatchSet::new(roots, &config.extensions);
        tracing::debug!(
            "Tracking extensions: {}",
            watch_set.extensions().collect::<Vec<_>>().join(", ")
        );

        let (inbox_tx, inbox_rx) = channel();
        let (request_tx, request_rx) = channel();
        let (raw_tx, raw_rx) = channel();

        let worker = FormatWorker::spawn(
            gateway,
            request_rx,
            inbox_tx.clone(),
            shutdown.clone(),
            config.worker.poll_interval(),
        )?;

        let normalizer = EventNormalizer::new(inbox_tx.clone()).spawn(
            raw_rx,
            config.watcher.batch_window(),
            shutdown.clone(),
        )?;

        let handler = move |res: notify::Result<Event>| {
            let _ = raw_tx.send(res);
        };
        let mut watcher: Box<dyn Watcher + Send> = match config.watcher.poll_interval_ms {
            Some(ms) => {
                let notify_config =
                    notify::Config::default().with_poll_interval(Duration::from_millis(ms));
                Box::new(PollWatcher::new(handler, notify_config)?)
            }
            None => Box::new(RecommendedWatcher::new(handler, notify::Config::default())?),
        };
        for root in watch_set.roots() {
            watcher.watch(root, RecursiveMode::Recursive)?;
            tracing::info!("Watching {}", root.display());
        }

        let coordinator = StateCoordinator::new(watch_set, request_tx)
            .with_touch_policy(config.touch_policy)
            .with_auto_format(config.auto_format);

        Ok(Self {
            coordinator,
            inbox_tx,
            inbox_rx,
            watcher: Some(watcher),
            normalizer: Some(normalizer),
            worker: Some(worker),
            shutdown,
        })
    }

    pub fn send(&self, message: Message) {
        // The receiver lives in `self`, so this cannot fail while we exist.
        let _ = self.inbox_tx.send(message);
    }

    /// Processes everything queued right now without blocking.
    pub fn tick(&mut self) -> DrainOutcome {
        self.coordinator.drain(&self.inbox_rx, &self.shutdown)
    }

    /// Blocks up to `timeout` for the first message, then drains the rest.
    /// Only for front ends with no redraw work (the console); the TUI uses
    /// [`Self::tick`], which never blocks.
    pub fn wait(&mut self, timeout: Duration) -> DrainOutcome {
        if self.shutdown.is_cancelled() {
            return DrainOutcome::ShouldExit;
        }

        match self.inbox_rx.recv_timeout(timeout) {
            Ok(message) => self.coordinator.handle(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                return DrainOutcome::QueueWasEmpty;
            }
        }

        match self.tick() {
            DrainOutcome::QueueWasEmpty => DrainOutcome::Processed(1),
            DrainOutcome::Processed(n) => DrainOutcome::Processed(n + 1),
            DrainOutcome::ShouldExit => DrainOutcome::ShouldExit,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.coordinator.snapshot()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.coordinator.take_notices()
    }

    pub fn coordinator(&self) -> &StateCoordinator {
        &self.coordinator
    }

    pub fn shutdown_token(&self) -> &ShutdownToken {
        &self.shutdown
    }

    /// True if the worker thread died without being asked to.
    pub fn worker_finished(&self) -> bool {
        self.worker.as_ref().is_some_and(FormatWorker::is_finished)
    }

    /// Stops producers first, then the worker. A formatter call in progress
    /// finishes before the worker notices the token.
    pub fn shutdown(mut self) -> Result<()> {
        self.shutdown.cancel();
        drop(self.watcher.take());
        self.coordinator.stop_issuing();

        if let Some(normalizer) = self.normalizer.take()
            && normalizer.join().is_err()
        {
            tracing::error!("Event normalizer panicked");
        }

        let result = match self.worker.take() {
            Some(worker) => worker.join(),
            None => Ok(()),
        };
        if matches!(result, Err(Error::WorkerPanicked)) {
            tracing::error!("Format worker panicked");
        }
        tracing::debug!("Runtime stopped");
        result
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
