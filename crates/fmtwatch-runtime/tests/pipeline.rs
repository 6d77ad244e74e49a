//! Worker and coordinator running on real threads with the fake formatter.

use fmtwatch_runtime::{
    Config, DrainOutcome, FormatWorker, Runtime, ShutdownToken, StateCoordinator, WatcherConfig,
};
use fmtwatch_testing::assertions::eventually;
use fmtwatch_testing::fixtures::{FORMATTED_SOURCE, UNFORMATTED_SOURCE};
use fmtwatch_testing::{FakeGateway, GatewayCall, TestWorld};
use fmtwatch_types::{Classification, Message, Notice, WatchSet};
use std::sync::mpsc::channel;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn test_worker_and_coordinator_format_everything() {
    let world = TestWorld::new();
    let clean = world.write_source("clean.cpp", FORMATTED_SOURCE).unwrap();
    let dirty = world.write_source("lib/dirty.h", UNFORMATTED_SOURCE).unwrap();

    let gateway = FakeGateway::new();
    let shutdown = ShutdownToken::new();
    let (inbox_tx, inbox_rx) = channel();
    let (request_tx, request_rx) = channel();
    let worker = FormatWorker::spawn(
        Box::new(gateway.clone()),
        request_rx,
        inbox_tx.clone(),
        shutdown.clone(),
        Duration::from_millis(20),
    )
    .unwrap();

    let watch_set = WatchSet::new(vec![world.root().to_path_buf()], ["cpp", "h"]);
    let mut coordinator = StateCoordinator::new(watch_set, request_tx);

    inbox_tx.send(Message::AddAll).unwrap();
    assert!(eventually(TIMEOUT, || {
        coordinator.drain(&inbox_rx, &shutdown);
        coordinator.model().formatted_len() == 1 && coordinator.model().pending_len() == 1
    }));

    inbox_tx.send(Message::FormatAll).unwrap();
    assert!(eventually(TIMEOUT, || {
        coordinator.drain(&inbox_rx, &shutdown);
        coordinator.model().pending_len() == 0
    }));

    assert_eq!(world.read(&dirty).unwrap(), FORMATTED_SOURCE);
    assert!(matches!(
        coordinator.model().classification(&clean),
        Some(Classification::Formatted(_))
    ));
    assert!(gateway.calls().contains(&GatewayCall::Apply(dirty.clone())));
    assert!(!gateway.applies().contains(&clean));
    assert!(
        coordinator
            .take_notices()
            .contains(&Notice::Formatted { path: dirty })
    );

    coordinator.stop_issuing();
    worker.join().unwrap();
}

#[test]
fn test_panicking_formatter_reports_failure() {
    let world = TestWorld::new();
    let path = world.write_source("boom.cpp", UNFORMATTED_SOURCE).unwrap();

    let gateway = FakeGateway::new();
    gateway.panic_on(path.clone());
    let shutdown = ShutdownToken::new();
    let (inbox_tx, inbox_rx) = channel();
    let (request_tx, request_rx) = channel();
    let worker = FormatWorker::spawn(
        Box::new(gateway),
        request_rx,
        inbox_tx.clone(),
        shutdown.clone(),
        Duration::from_millis(20),
    )
    .unwrap();

    let watch_set = WatchSet::new(vec![world.root().to_path_buf()], ["cpp"]);
    let mut coordinator = StateCoordinator::new(watch_set, request_tx);

    inbox_tx.send(Message::FormatOne(path.clone())).unwrap();
    let mut notices = Vec::new();
    assert!(eventually(TIMEOUT, || {
        coordinator.drain(&inbox_rx, &shutdown);
        notices.extend(coordinator.take_notices());
        !notices.is_empty()
    }));
    assert_eq!(notices, vec![Notice::FormatFailed { path }]);

    // The worker survived the panic and still stops cleanly.
    assert!(!worker.is_finished());
    shutdown.cancel();
    worker.join().unwrap();
}

#[test]
fn test_runtime_picks_up_file_changes() {
    let world = TestWorld::new();
    let config = Config {
        watcher: WatcherConfig {
            poll_interval_ms: Some(50),
            ..WatcherConfig::default()
        },
        ..Config::default()
    };
    let gateway = FakeGateway::new();
    let mut runtime = Runtime::start(
        &[world.root().to_path_buf()],
        &config,
        Box::new(gateway.clone()),
        ShutdownToken::new(),
    )
    .unwrap();

    // Give the poll watcher its initial scan before writing.
    std::thread::sleep(Duration::from_millis(200));
    let path = world.write_source("new.cpp", UNFORMATTED_SOURCE).unwrap();

    assert!(eventually(TIMEOUT, || {
        runtime.wait(Duration::from_millis(50));
        runtime.snapshot().pending().any(|entry| entry.path == path)
    }));

    runtime.send(Message::SetAutoFormat(true));
    assert!(eventually(TIMEOUT, || {
        runtime.wait(Duration::from_millis(50));
        runtime.snapshot().formatted().any(|entry| entry.path == path)
    }));
    assert!(runtime.coordinator().auto_format());
    assert_eq!(world.read(&path).unwrap(), FORMATTED_SOURCE);

    runtime.shutdown().unwrap();
}

#[test]
fn test_runtime_rejects_bad_roots() {
    let world = TestWorld::new();
    let file = world.write_source("a.cpp", FORMATTED_SOURCE).unwrap();
    let missing = world.root().join("missing");

    for roots in [vec![missing], vec![file], vec![]] {
        let result = Runtime::start(
            &roots,
            &Config::default(),
            Box::new(FakeGateway::new()),
            ShutdownToken::new(),
        );
        assert!(result.is_err());
    }
}

#[test]
fn test_runtime_exits_on_cancel() {
    let world = TestWorld::new();
    let shutdown = ShutdownToken::new();
    let mut runtime = Runtime::start(
        &[world.root().to_path_buf()],
        &Config::default(),
        Box::new(FakeGateway::new()),
        shutdown.clone(),
    )
    .unwrap();

    shutdown.cancel();
    assert_eq!(runtime.tick(), DrainOutcome::ShouldExit);
    assert_eq!(runtime.wait(Duration::from_millis(10)), DrainOutcome::ShouldExit);
    runtime.shutdown().unwrap();
}
