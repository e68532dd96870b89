//! Shared utilities for the civic client.

pub mod logging;
pub mod spans;

pub use logging::{init_logging, LogFormat};
