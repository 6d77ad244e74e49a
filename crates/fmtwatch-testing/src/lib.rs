//! Testing infrastructure for fmtwatch integration tests.
//!
//! - `TestWorld`: isolated source tree, config file and CLI command setup
//! - `gateway`: scripted in-process formatter
//! - `fixtures`: sample sources and a stand-in `clang-format` script
//! - `process`: background `fmtwatch watch` processes
//! - `assertions`: polling and JSON-line helpers

pub mod assertions;
pub mod fixtures;
pub mod gateway;
pub mod process;
pub mod world;

pub use gateway::{FakeGateway, GatewayCall};
pub use world::TestWorld;
