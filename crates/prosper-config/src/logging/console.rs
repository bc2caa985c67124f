//! Stderr sink with a level threshold

use super::traits::{LogLevel, Logger};

/// Writes `<prefix> LEVEL: message` lines to stderr
///
/// Messages below `min_level` are dropped. The default threshold is
/// `Warn`, so resolution chatter stays quiet unless asked for.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            prefix: "[prosper-config]".to_string(),
            min_level: LogLevel::Warn,
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::new()
        }
    }

    pub fn with_min_level(mut self, min_level: LogLevel) -> Self {
        self.min_level = min_level;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    fn line(&self, level: LogLevel, message: &str) -> String {
        format!("{} {}: {}", self.prefix, level, message)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if self.enabled(level) {
            eprintln!("{}", self.line(level, message));
        }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }
}
