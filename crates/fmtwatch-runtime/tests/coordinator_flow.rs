//! Drives the coordinator synchronously: requests are read straight off the
//! request channel and completions are fed back by hand.

use fmtwatch_runtime::{StateCoordinator, TouchPolicy};
use fmtwatch_testing::TestWorld;
use fmtwatch_testing::fixtures::{FORMATTED_SOURCE, UNFORMATTED_SOURCE};
use fmtwatch_types::{
    Classification, FormatCompletion, FormatRequest, Message, Notice, WatchSet,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, channel};
use std::time::SystemTime;

struct Harness {
    world: TestWorld,
    coordinator: StateCoordinator,
    requests: Receiver<FormatRequest>,
}

impl Harness {
    fn new() -> Self {
        let world = TestWorld::new();
        let (tx, requests) = channel();
        let watch_set = WatchSet::new(vec![world.root().to_path_buf()], ["cpp", "h"]);
        Self {
            world,
            coordinator: StateCoordinator::new(watch_set, tx),
            requests,
        }
    }

    fn source(&self, name: &str, content: &str, mtime: u64) -> (PathBuf, SystemTime) {
        let path = self.world.write_source(name, content).unwrap();
        let at = self.world.set_mtime_secs(&path, mtime).unwrap();
        (path, at)
    }

    fn issued(&self) -> Vec<FormatRequest> {
        self.requests.try_iter().collect()
    }

    fn changed(&mut self, path: &Path) {
        self.coordinator.handle(Message::FileChanged(path.to_path_buf()));
    }

    fn complete(&mut self, request: FormatRequest, success: bool) {
        self.coordinator
            .handle(Message::Completed(FormatCompletion { request, success }));
    }

    fn classification(&self, path: &Path) -> Option<Classification> {
        self.coordinator.model().classification(path)
    }

    fn assert_disjoint(&self) {
        let snapshot = self.coordinator.snapshot();
        for entry in &snapshot.entries {
            let model = self.coordinator.model();
            assert!(
                !(model.formatted_at(&entry.path).is_some()
                    && model.pending_since(&entry.path).is_some()),
                "{} is both formatted and pending",
                entry.path.display()
            );
        }
    }
}

fn check(path: &Path, captured: SystemTime) -> FormatRequest {
    FormatRequest::Check {
        path: path.to_path_buf(),
        captured,
    }
}

fn apply(path: &Path) -> FormatRequest {
    FormatRequest::Apply {
        path: path.to_path_buf(),
    }
}

#[test]
fn test_reclassification_across_mtimes() {
    let mut h = Harness::new();
    let (path, t100) = h.source("a/x.cpp", FORMATTED_SOURCE, 100);

    h.changed(&path);
    assert_eq!(h.issued(), vec![check(&path, t100)]);
    h.complete(check(&path, t100), true);
    assert_eq!(h.classification(&path), Some(Classification::Formatted(t100)));

    // Same mtime again: nothing to do.
    h.changed(&path);
    assert!(h.issued().is_empty());

    let t150 = h.world.set_mtime_secs(&path, 150).unwrap();
    h.changed(&path);
    assert_eq!(h.issued(), vec![check(&path, t150)]);
    h.complete(check(&path, t150), false);

    assert_eq!(h.classification(&path), Some(Classification::Pending(t150)));
    assert_eq!(h.coordinator.model().formatted_at(&path), None);
    assert_eq!(
        h.coordinator.take_notices(),
        vec![Notice::Pending {
            path: path.clone(),
            since: t150
        }]
    );
    h.assert_disjoint();
}

#[test]
fn test_duplicate_events_before_completion_issue_one_check() {
    let mut h = Harness::new();
    let (path, t100) = h.source("x.cpp", UNFORMATTED_SOURCE, 100);

    h.changed(&path);
    h.changed(&path);
    h.changed(&path);
    assert_eq!(h.issued(), vec![check(&path, t100)]);

    // A new mtime may legitimately issue a second check.
    let t150 = h.world.set_mtime_secs(&path, 150).unwrap();
    h.changed(&path);
    assert_eq!(h.issued(), vec![check(&path, t150)]);
}

#[test]
fn test_stale_check_completion_keeps_newer_in_flight() {
    let mut h = Harness::new();
    let (path, t100) = h.source("x.cpp", UNFORMATTED_SOURCE, 100);
    h.changed(&path);
    let t150 = h.world.set_mtime_secs(&path, 150).unwrap();
    h.changed(&path);
    h.issued();

    h.complete(check(&path, t100), false);
    assert_eq!(h.classification(&path), Some(Classification::Pending(t100)));

    // The t150 check is still outstanding, so a repeat event is absorbed.
    h.changed(&path);
    assert!(h.issued().is_empty());

    h.complete(check(&path, t150), false);
    assert_eq!(h.classification(&path), Some(Classification::Pending(t150)));
    assert_eq!(h.coordinator.take_notices().len(), 2);
}

#[test]
fn test_deletion_race_forgets_path() {
    let mut h = Harness::new();
    let (path, t100) = h.source("x.cpp", UNFORMATTED_SOURCE, 100);
    h.changed(&path);
    h.issued();
    h.complete(check(&path, t100), false);
    assert!(h.classification(&path).is_some());

    std::fs::remove_file(&path).unwrap();
    h.changed(&path);

    assert!(h.issued().is_empty());
    assert_eq!(h.classification(&path), None);
    assert!(h.coordinator.model().is_empty());
}

#[test]
fn test_format_all_converges() {
    let mut h = Harness::new();
    let mut paths = Vec::new();
    for (i, name) in ["a.cpp", "b.h", "sub/c.cpp"].iter().enumerate() {
        let (path, at) = h.source(name, UNFORMATTED_SOURCE, 100 + i as u64);
        h.changed(&path);
        h.complete(check(&path, at), false);
        paths.push(path);
    }
    h.issued();
    assert_eq!(h.coordinator.model().pending_len(), 3);

    h.coordinator.handle(Message::FormatAll);
    let applies = h.issued();
    assert_eq!(applies.len(), 3);

    for request in applies {
        std::fs::write(request.path(), FORMATTED_SOURCE).unwrap();
        h.complete(request, true);
    }

    assert_eq!(h.coordinator.model().pending_len(), 0);
    assert_eq!(h.coordinator.model().formatted_len(), 3);
    for path in &paths {
        assert!(matches!(
            h.classification(path),
            Some(Classification::Formatted(_))
        ));
    }
    h.assert_disjoint();
}

#[test]
fn test_format_one_success_records_current_mtime() {
    let mut h = Harness::new();
    let (path, t100) = h.source("a/x.cpp", UNFORMATTED_SOURCE, 100);
    h.changed(&path);
    h.complete(check(&path, t100), false);
    h.coordinator.take_notices();

    h.coordinator.handle(Message::FormatOne(path.clone()));
    assert_eq!(h.issued(), vec![check(&path, t100), apply(&path)]);

    std::fs::write(&path, FORMATTED_SOURCE).unwrap();
    let t200 = h.world.set_mtime_secs(&path, 200).unwrap();
    h.complete(apply(&path), true);

    assert_eq!(h.classification(&path), Some(Classification::Formatted(t200)));
    let notices = h.coordinator.take_notices();
    assert_eq!(notices, vec![Notice::Formatted { path: path.clone() }]);
    assert_eq!(notices[0].to_string(), format!("Formatted {}", path.display()));

    // The watcher reports the apply's own write; it is already accounted for.
    h.changed(&path);
    assert!(h.issued().is_empty());
}

#[test]
fn test_apply_failure_leaves_state_alone() {
    let mut h = Harness::new();
    let (path, t100) = h.source("x.cpp", UNFORMATTED_SOURCE, 100);
    h.changed(&path);
    h.complete(check(&path, t100), false);
    h.coordinator.take_notices();
    let before = h.coordinator.model().clone();

    h.complete(apply(&path), false);

    assert_eq!(h.coordinator.model(), &before);
    assert_eq!(h.classification(&path), Some(Classification::Pending(t100)));
    let notices = h.coordinator.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(
        notices[0].to_string(),
        format!("ERROR formatting {}", path.display())
    );
}

#[test]
fn test_format_one_ignores_untracked_extension() {
    let mut h = Harness::new();
    let (path, _) = h.source("notes.md", "# notes\n", 100);

    h.coordinator.handle(Message::FormatOne(path));
    assert!(h.issued().is_empty());
}

#[test]
fn test_touch_formatted_file_moves_timestamp() {
    let mut h = Harness::new();
    let (path, t100) = h.source("x.cpp", FORMATTED_SOURCE, 100);
    h.changed(&path);
    h.complete(check(&path, t100), true);

    h.coordinator.handle(Message::TouchOne(path.clone()));

    let touched = std::fs::metadata(&path).unwrap().modified().unwrap();
    assert!(touched > t100);
    assert_eq!(h.classification(&path), Some(Classification::Formatted(touched)));

    // The touch's own change event does not re-check.
    h.issued();
    h.changed(&path);
    assert!(h.issued().is_empty());
}

#[test]
fn test_touch_policies_never_touch_unformatted_files() {
    for policy in [TouchPolicy::Ignore, TouchPolicy::Reject] {
        let mut h = Harness::new();
        h.coordinator = h.coordinator.with_touch_policy(policy);
        let (pending, t100) = h.source("pending.cpp", UNFORMATTED_SOURCE, 100);
        let (unknown, t120) = h.source("unknown.cpp", FORMATTED_SOURCE, 120);
        h.changed(&pending);
        h.complete(check(&pending, t100), false);
        h.coordinator.take_notices();

        h.coordinator.handle(Message::TouchOne(pending.clone()));
        h.coordinator.handle(Message::TouchOne(unknown.clone()));

        assert_eq!(std::fs::metadata(&pending).unwrap().modified().unwrap(), t100);
        assert_eq!(std::fs::metadata(&unknown).unwrap().modified().unwrap(), t120);
        assert_eq!(h.classification(&pending), Some(Classification::Pending(t100)));
        assert_eq!(h.classification(&unknown), None);

        let notices = h.coordinator.take_notices();
        match policy {
            TouchPolicy::Ignore => assert!(notices.is_empty()),
            TouchPolicy::Reject => assert_eq!(
                notices,
                vec![
                    Notice::TouchRejected { path: pending },
                    Notice::TouchRejected { path: unknown },
                ]
            ),
        }
    }
}

#[test]
fn test_add_all_checks_every_tracked_file() {
    let mut h = Harness::new();
    let (a, _) = h.source("a.cpp", FORMATTED_SOURCE, 100);
    let (b, _) = h.source("deep/er/b.h", UNFORMATTED_SOURCE, 100);
    h.source("README.md", "readme\n", 100);

    h.coordinator.handle(Message::AddAll);

    let mut checked: Vec<PathBuf> = h
        .issued()
        .iter()
        .map(|request| request.path().to_path_buf())
        .collect();
    checked.sort();
    assert_eq!(checked, vec![a, b]);
}

#[test]
fn test_auto_format_waits_for_format_all() {
    let mut h = Harness::new();
    h.coordinator = h.coordinator.with_auto_format(true);
    let (path, t100) = h.source("x.cpp", UNFORMATTED_SOURCE, 100);

    h.changed(&path);
    h.complete(check(&path, t100), false);
    // Still being edited: classified, but left alone until the next FormatAll.
    assert_eq!(h.issued(), vec![check(&path, t100)]);
    assert_eq!(h.classification(&path), Some(Classification::Pending(t100)));

    h.coordinator.handle(Message::FormatAll);
    assert_eq!(h.issued(), vec![apply(&path)]);
}

#[test]
fn test_restored_file_with_same_mtime_is_checked_again() {
    let mut h = Harness::new();
    let (path, t100) = h.source("a.cpp", FORMATTED_SOURCE, 100);

    h.changed(&path);
    assert_eq!(h.issued(), vec![check(&path, t100)]);

    std::fs::remove_file(&path).unwrap();
    h.changed(&path);
    assert!(h.issued().is_empty());

    // Restored the way `cp -p` or `tar x` would: same mtime as before.
    let (_, restored) = h.source("a.cpp", FORMATTED_SOURCE, 100);
    assert_eq!(restored, t100);
    h.changed(&path);
    assert_eq!(h.issued(), vec![check(&path, t100)]);

    // The first check ran while the file was gone and reports failure.
    h.complete(check(&path, t100), false);
    h.complete(check(&path, t100), true);
    assert_eq!(h.classification(&path), Some(Classification::Formatted(t100)));
    h.assert_disjoint();
}

#[test]
fn test_snapshot_orders_newest_first() {
    let mut h = Harness::new();
    let (old, t100) = h.source("old.cpp", FORMATTED_SOURCE, 100);
    let (new, t300) = h.source("new.cpp", UNFORMATTED_SOURCE, 300);
    h.complete(check(&old, t100), true);
    h.complete(check(&new, t300), false);

    let snapshot = h.coordinator.snapshot();
    let order: Vec<&Path> = snapshot.entries.iter().map(|e| e.path.as_path()).collect();
    assert_eq!(order, vec![new.as_path(), old.as_path()]);
    assert_eq!(snapshot.roots, vec![h.world.root().to_path_buf()]);
    assert_eq!(snapshot.pending().count(), 1);
}
