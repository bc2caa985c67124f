//! In-memory logger

use std::sync::RwLock;

use super::traits::{LogLevel, Logger};

/// Logger that keeps every record in memory
///
/// Useful in tests, and for hosts that want to surface resolution messages
/// after the fact instead of streaming them.
///
/// # Example
///
/// ```
/// use prosper_config::logging::{Logger, LogLevel, MemoryLogger};
///
/// let logger = MemoryLogger::new();
/// logger.warn("api.timeout not found in global config");
/// assert_eq!(logger.count(LogLevel::Warn), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: RwLock<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    /// Create a new empty memory logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records, oldest first
    pub fn records(&self) -> Vec<(LogLevel, String)> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    /// Messages logged at exactly `level`
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// Number of records at exactly `level`
    pub fn count(&self, level: LogLevel) -> usize {
        self.messages(level).len()
    }

    /// Whether any record contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.records().iter().any(|(_, m)| m.contains(needle))
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.write() {
            records.clear();
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if let Ok(mut records) = self.records.write() {
            records.push((level, message.to_string()));
        }
    }
}
