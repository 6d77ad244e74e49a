pub mod path;
pub mod time;

pub use path::{display_dir, file_name, fit_dir};
pub use time::{ago_text, rfc3339};
