pub mod config;
pub mod doctor;
pub mod watch;
pub mod watch_console;
