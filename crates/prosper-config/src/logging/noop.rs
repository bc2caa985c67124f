//! Silent sink

use std::sync::Arc;

use super::traits::{LogLevel, Logger, SharedLogger};

/// Sink that drops everything
///
/// Resolvers built without a logger get one of these, so an application
/// that never wires logging pays nothing for resolution messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }

    /// Shared handle, ready to pass as a resolver's sink
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl Logger for NoOpLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}

    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }
}
