//! P1 exporter daemon library - exposes modules for testing.

pub mod cli;
pub mod config;
pub mod exporter;
pub mod metrics;
pub mod server;
pub mod source;
