//! Logging abstractions
//!
//! The resolver talks to a `Logger` it owns. The loader reports through the
//! process-wide channel (`GlobalLogger`) unless handed a sink explicitly.

mod traits;
mod noop;
mod console;
mod memory;
mod global;

pub use traits::{LogLevel, Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::MemoryLogger;
pub use global::{GlobalLogger, Subscription, DEBUG_ENV_VAR, LOG_LEVEL_ENV_VAR};
