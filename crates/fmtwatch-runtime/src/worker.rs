use crate::gateway::FormatterGateway;
use crate::shutdown::ShutdownToken;
use crate::{Error, Result};
use fmtwatch_types::{FormatCompletion, FormatRequest, Message};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Dedicated thread that runs formatter calls so nothing else ever blocks on
/// the external process. Requests are served FIFO.
pub struct FormatWorker {
    handle: JoinHandle<()>,
}

impl FormatWorker {
    /// The worker exits when the token is cancelled (noticed within
    /// `poll_interval`), when every request sender is dropped, or when the
    /// outbox is closed.
    pub fn spawn(
        gateway: Box<dyn FormatterGateway>,
        requests: Receiver<FormatRequest>,
        outbox: Sender<Message>,
        shutdown: ShutdownToken,
        poll_interval: Duration,
    ) -> Result<Self> {
        let handle = std::thread::Builder::new()
            .name("fmtwatch-worker".to_string())
            .spawn(move || run(gateway.as_ref(), &requests, &outbox, &shutdown, poll_interval))?;

        Ok(Self { handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<()> {
        self.handle.join().map_err(|_| Error::WorkerPanicked)
    }
}

fn run(
    gateway: &dyn FormatterGateway,
    requests: &Receiver<FormatRequest>,
    outbox: &Sender<Message>,
    shutdown: &ShutdownToken,
    poll_interval: Duration,
) {
    tracing::debug!("Format worker started ({})", gateway.name());

    loop {
        let received = requests.recv_timeout(poll_interval);
        if shutdown.is_cancelled() {
            break;
        }

        let request = match received {
            Ok(request) => request,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        tracing::debug!("Running {} on {}", request.kind(), request.path().display());
        let completion = execute(gateway, request);
        if outbox.send(Message::Completed(completion)).is_err() {
            break;
        }
    }

    tracing::debug!("Format worker stopped");
}

/// Runs one request against the gateway. A panicking gateway is reported as
/// a failed operation instead of taking the worker down.
pub fn execute(gateway: &dyn FormatterGateway, request: FormatRequest) -> FormatCompletion {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| match &request {
        FormatRequest::Check { path, .. } => gateway.check(path),
        FormatRequest::Apply { path } => gateway.apply(path),
    }));

    let success = match result {
        Ok(success) => success,
        Err(panic_err) => {
            let panic_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            tracing::error!(
                "{} panicked during {} of {}: {}",
                gateway.name(),
                request.kind(),
                request.path().display(),
                panic_msg
            );
            false
        }
    };

    FormatCompletion { request, success }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::mpsc::channel;
    use std::time::SystemTime;

    struct ByName;

    impl FormatterGateway for ByName {
        fn name(&self) -> &str {
            "by-name"
        }

        fn check(&self, path: &Path) -> bool {
            path.to_string_lossy().contains("clean")
        }

        fn apply(&self, path: &Path) -> bool {
            if path.to_string_lossy().contains("explode") {
                panic!("formatter exploded");
            }
            true
        }
    }

    #[test]
    fn test_execute_maps_outcomes() {
        let check = execute(
            &ByName,
            FormatRequest::Check {
                path: PathBuf::from("/a/clean.cpp"),
                captured: SystemTime::UNIX_EPOCH,
            },
        );
        assert!(check.success);

        let apply = execute(
            &ByName,
            FormatRequest::Apply {
                path: PathBuf::from("/a/explode.cpp"),
            },
        );
        assert!(!apply.success);
        assert_eq!(apply.request.path(), Path::new("/a/explode.cpp"));
    }

    #[test]
    fn test_worker_preserves_fifo_and_exits_on_disconnect() {
        let (request_tx, request_rx) = channel();
        let (outbox_tx, outbox_rx) = channel();

        let worker = FormatWorker::spawn(
            Box::new(ByName),
            request_rx,
            outbox_tx,
            ShutdownToken::new(),
            Duration::from_millis(10),
        )
        .unwrap();

        for name in ["/a/clean.cpp", "/a/dirty.cpp", "/a/clean2.cpp"] {
            request_tx
                .send(FormatRequest::Check {
                    path: PathBuf::from(name),
                    captured: SystemTime::UNIX_EPOCH,
                })
                .unwrap();
        }
        drop(request_tx);
        worker.join().unwrap();

        let results: Vec<(PathBuf, bool)> = outbox_rx
            .try_iter()
            .map(|msg| match msg {
                Message::Completed(c) => (c.request.path().to_path_buf(), c.success),
                other => panic!("unexpected message {:?}", other),
            })
            .collect();
        assert_eq!(
            results,
            vec![
                (PathBuf::from("/a/clean.cpp"), true),
                (PathBuf::from("/a/dirty.cpp"), false),
                (PathBuf::from("/a/clean2.cpp"), true),
            ]
        );
    }

    #[test]
    fn test_worker_stops_on_cancel() {
        let (_request_tx, request_rx) = channel::<FormatRequest>();
        let (outbox_tx, _outbox_rx) = channel();
        let shutdown = ShutdownToken::new();

        let worker = FormatWorker::spawn(
            Box::new(ByName),
            request_rx,
            outbox_tx,
            shutdown.clone(),
            Duration::from_millis(10),
        )
        .unwrap();

        shutdown.cancel();
        worker.join().unwrap();
    }
}
