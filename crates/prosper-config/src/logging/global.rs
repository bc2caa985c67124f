//! Process-wide warnings channel
//!
//! This is the crate's counterpart of Python's `warnings.warn`: the loader
//! reports a missing local file here, and the legacy `get_config` reports
//! its deprecation, independently of whatever sink a resolver carries.
//!
//! Every message goes to:
//! - stderr, for `Warn` and `Error`, as `module: WARNING: message`;
//! - `$TMPDIR/prosper-config.log`, timestamped, when `PROSPER_CONFIG_DEBUG`
//!   is unset/`1`/`true` and the level reaches `PROSPER_CONFIG_LOG_LEVEL`
//!   (default `debug`);
//! - every sink registered with [`GlobalLogger::subscribe`].

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::{Mutex, OnceLock};

use super::traits::{LogLevel, Logger, SharedLogger};

/// Environment variable that switches the log file on or off
pub const DEBUG_ENV_VAR: &str = "PROSPER_CONFIG_DEBUG";

/// Environment variable holding the minimum level written to the log file
pub const LOG_LEVEL_ENV_VAR: &str = "PROSPER_CONFIG_LOG_LEVEL";

const LOG_FILE_NAME: &str = "prosper-config.log";

struct Channel {
    file: Option<File>,
    min_level: LogLevel,
    subscribers: Vec<(u64, SharedLogger)>,
    next_id: u64,
}

impl Channel {
    fn from_env() -> Self {
        let enabled = std::env::var(DEBUG_ENV_VAR)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        let file = if enabled {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(std::env::temp_dir().join(LOG_FILE_NAME))
                .ok()
        } else {
            None
        };
        let min_level = std::env::var(LOG_LEVEL_ENV_VAR)
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);

        Self {
            file,
            min_level,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    fn write_file(&mut self, level: LogLevel, module: &str, message: &str) {
        if level < self.min_level {
            return;
        }
        if let Some(file) = self.file.as_mut() {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] [{:<7}] [{}] {}", timestamp, level.as_str(), module, message);
            let _ = file.flush();
        }
    }
}

static CHANNEL: OnceLock<Mutex<Channel>> = OnceLock::new();

fn channel() -> &'static Mutex<Channel> {
    CHANNEL.get_or_init(|| Mutex::new(Channel::from_env()))
}

fn dispatch(level: LogLevel, module: &str, message: &str) {
    if level >= LogLevel::Warn {
        eprintln!("{}: {}: {}", module, level, message);
    }

    // Subscribers run outside the lock so they may log here themselves.
    let subscribers: Vec<SharedLogger> = match channel().lock() {
        Ok(mut channel) => {
            channel.write_file(level, module, message);
            channel.subscribers.iter().map(|(_, s)| s.clone()).collect()
        }
        Err(_) => return,
    };
    for subscriber in subscribers {
        subscriber.log(level, message);
    }
}

/// `Logger` over the process-wide channel, tagged with a module name
#[derive(Debug, Clone)]
pub struct GlobalLogger {
    module: String,
}

impl Default for GlobalLogger {
    fn default() -> Self {
        Self::new("prosper_config")
    }
}

impl GlobalLogger {
    pub fn new(module: impl Into<String>) -> Self {
        Self { module: module.into() }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Forward every channel message to `sink` until the guard is dropped
    pub fn subscribe(sink: SharedLogger) -> Subscription {
        let Ok(mut channel) = channel().lock() else {
            return Subscription { id: None };
        };
        let id = channel.next_id;
        channel.next_id += 1;
        channel.subscribers.push((id, sink));
        Subscription { id: Some(id) }
    }
}

impl Logger for GlobalLogger {
    fn log(&self, level: LogLevel, message: &str) {
        dispatch(level, &self.module, message);
    }
}

/// Keeps a [`GlobalLogger::subscribe`] sink attached while alive
#[must_use = "the sink is detached as soon as the subscription is dropped"]
#[derive(Debug)]
pub struct Subscription {
    id: Option<u64>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(id) = self.id else {
            return;
        };
        if let Ok(mut channel) = channel().lock() {
            channel.subscribers.retain(|(sid, _)| *sid != id);
        }
    }
}
