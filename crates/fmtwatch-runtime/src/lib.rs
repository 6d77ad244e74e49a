pub mod config;
pub mod coordinator;
pub mod error;
pub mod fs;
pub mod gateway;
pub mod normalizer;
pub mod runtime;
pub mod shutdown;
pub mod worker;

pub use config::{Config, FormatterConfig, TouchPolicy, WatcherConfig, WorkerConfig};
pub use coordinator::{DrainOutcome, StateCoordinator};
pub use error::{Error, ProbeError, Result};
pub use gateway::{ClangFormat, FormatterGateway};
pub use normalizer::{EventNormalizer, normalize_batch};
pub use runtime::Runtime;
pub use shutdown::ShutdownToken;
pub use worker::FormatWorker;
