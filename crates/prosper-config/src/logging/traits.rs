//! Logger trait and severity levels

use std::sync::Arc;

/// Message severity, ordered from chattiest to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name, case-insensitive; `warning` is accepted for `Warn`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message sink handed to the resolver and the loader
///
/// Implementors provide `log`; the per-level methods forward to it.
/// `enabled` lets a sink opt out of a level before any message is built,
/// which the `log_debug!`/`log_warn!` macros check.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn enabled(&self, _level: LogLevel) -> bool {
        true
    }

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Type alias for an Arc-wrapped logger
pub type SharedLogger = Arc<dyn Logger>;

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(&self, level: LogLevel, message: &str) {
        (**self).log(level, message)
    }

    fn enabled(&self, level: LogLevel) -> bool {
        (**self).enabled(level)
    }
}

/// Format and log at debug level, skipping the format when the sink is off
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {{
        let logger = &$logger;
        if logger.enabled($crate::logging::LogLevel::Debug) {
            logger.debug(&format!($($arg)*));
        }
    }};
}

/// Format and log at warning level, skipping the format when the sink is off
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {{
        let logger = &$logger;
        if logger.enabled($crate::logging::LogLevel::Warn) {
            logger.warn(&format!($($arg)*));
        }
    }};
}
