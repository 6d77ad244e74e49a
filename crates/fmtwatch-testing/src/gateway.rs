//! In-process formatter with a call log.

use crate::fixtures::{format_source, is_compliant};
use fmtwatch_runtime::FormatterGateway;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Check(PathBuf),
    Apply(PathBuf),
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<GatewayCall>,
    failing_applies: HashSet<PathBuf>,
    panicking: HashSet<PathBuf>,
}

/// Formats real files with the tab rule from [`crate::fixtures`]. Clones
/// share state, so keep one clone to inspect calls after boxing the other
/// into a worker.
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<State>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every apply on `path` report failure without writing.
    pub fn fail_apply(&self, path: impl Into<PathBuf>) {
        self.lock().failing_applies.insert(path.into());
    }

    /// Make any call on `path` panic.
    pub fn panic_on(&self, path: impl Into<PathBuf>) {
        self.lock().panicking.insert(path.into());
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    pub fn applies(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Apply(path) => Some(path),
                GatewayCall::Check(_) => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake gateway state poisoned")
    }

    fn record(&self, call: GatewayCall) {
        let mut state = self.lock();
        let path = match &call {
            GatewayCall::Check(path) | GatewayCall::Apply(path) => path.clone(),
        };
        state.calls.push(call);
        let panics = state.panicking.contains(&path);
        drop(state);
        if panics {
            panic!("fake formatter crashed on {}", path.display());
        }
    }
}

impl FormatterGateway for FakeGateway {
    fn name(&self) -> &str {
        "fake-clang-format"
    }

    fn check(&self, path: &Path) -> bool {
        self.record(GatewayCall::Check(path.to_path_buf()));
        std::fs::read_to_string(path).is_ok_and(|content| is_compliant(&content))
    }

    fn apply(&self, path: &Path) -> bool {
        self.record(GatewayCall::Apply(path.to_path_buf()));
        if self.lock().failing_applies.contains(path) {
            return false;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => std::fs::write(path, format_source(&content)).is_ok(),
            Err(_) => false,
        }
    }
}
