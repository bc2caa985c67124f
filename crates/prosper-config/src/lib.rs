//! Prosper Config
//!
//! Layered configuration for applications that ship a tracked `app.cfg`
//! and let each deployment drop an untracked `app_local.cfg` beside it for
//! secrets and machine-specific values.
//!
//! Values are picked in priority order:
//! 1. Arguments given at runtime
//! 2. `app_local.cfg`: untracked, may be missing
//! 3. `app.cfg`: tracked master config, must load
//! 4. The caller's default
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use prosper_config::{ConsoleLogger, OptionResolver};
//!
//! let config = OptionResolver::new("app.cfg", None, Arc::new(ConsoleLogger::new()), false)?;
//!
//! let user = config.get_str("db", "user", "postgres");
//! let port = config.resolve("db", "port", None, 5432);
//! # Ok::<(), prosper_config::ConfigError>(())
//! ```

pub mod document;
pub mod error;
pub mod loader;
pub mod logging;
pub mod resolver;

pub use document::{ConfigDocument, Interpolation, ParseError, ParserOptions, ValueError};

pub use error::{ConfigError, ConfigResult};

#[allow(deprecated)]
pub use loader::get_config;
pub use loader::{
    load_configs, load_configs_with, local_config_filepath,
    LoadedConfigs, LOCAL_SUFFIX, MASTER_SUFFIX,
};

pub use logging::{ConsoleLogger, GlobalLogger, LogLevel, Logger, MemoryLogger, NoOpLogger, SharedLogger};

pub use resolver::{OptionResolver, OptionSource, OptionValue, ResolvedOption};
