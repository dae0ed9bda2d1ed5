//! Logging initialization shared by the deployment binaries and their tests.
pub mod config;
pub mod tracing;

pub use config::Config;
