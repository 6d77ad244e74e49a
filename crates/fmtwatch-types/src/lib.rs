pub mod event;
pub mod message;
pub mod model;
pub mod watch_set;

pub use event::{ChangeKind, RawEvent};
pub use message::{FormatCompletion, FormatRequest, Message, Notice, OperationKind};
pub use model::{Classification, EntryState, FormatModel, Snapshot, SnapshotEntry};
pub use watch_set::{DEFAULT_EXTENSIONS, WatchSet};
