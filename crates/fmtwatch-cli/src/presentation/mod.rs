pub mod formatters;
pub mod renderers;
