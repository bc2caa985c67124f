//! Option resolution across runtime arguments, local and master configs
//!
//! Checks sources in priority order:
//! 1. Runtime argument (anything other than the caller's default)
//! 2. `<config>_local.cfg`: untracked overrides and secrets
//! 3. `<config>.cfg`: tracked master config
//! 4. The caller's default

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::document::ConfigDocument;
use crate::error::ConfigResult;
use crate::loader::{load_configs, local_config_filepath, LoadedConfigs};
use crate::logging::{Logger, NoOpLogger, SharedLogger};
use crate::{log_debug, log_warn};

/// Which tier supplied a resolved option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSource {
    /// Argument given at runtime
    Runtime,
    /// Untracked local config
    Local,
    /// Tracked master config
    Global,
    /// Caller's fallback default
    Default,
}

impl OptionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionSource::Runtime => "runtime",
            OptionSource::Local => "local",
            OptionSource::Global => "global",
            OptionSource::Default => "default",
        }
    }
}

impl std::fmt::Display for OptionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value produced by a resolution
///
/// Caller-supplied values come back with their own type. Config layers only
/// hold text; a presence-only key yields `Text(None)`.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue<T> {
    Given(T),
    Text(Option<String>),
}

/// Result of resolving one `(section, key)` pair
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOption<T> {
    pub value: OptionValue<T>,
    pub source: OptionSource,
}

impl<T> ResolvedOption<T> {
    fn given(value: T, source: OptionSource) -> Self {
        Self {
            value: OptionValue::Given(value),
            source,
        }
    }

    fn text(value: Option<Cow<'_, str>>, source: OptionSource) -> Self {
        Self {
            value: OptionValue::Text(value.map(Cow::into_owned)),
            source,
        }
    }

    /// Whether a config file supplied the value
    pub fn is_from_config(&self) -> bool {
        matches!(self.source, OptionSource::Local | OptionSource::Global)
    }

    /// Config text, if a config file supplied a real value
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            OptionValue::Text(text) => text.as_deref(),
            OptionValue::Given(_) => None,
        }
    }

    /// Caller-supplied value, if the runtime or default tier won
    pub fn into_given(self) -> Option<T> {
        match self.value {
            OptionValue::Given(value) => Some(value),
            OptionValue::Text(_) => None,
        }
    }
}

impl<T: ToString> ResolvedOption<T> {
    /// Render whatever won as text; presence-only keys give `None`
    pub fn into_text(self) -> Option<String> {
        match self.value {
            OptionValue::Given(value) => Some(value.to_string()),
            OptionValue::Text(text) => text,
        }
    }
}

/// Resolver over one logical configuration (master + optional local file)
///
/// Documents are loaded once at construction and never change afterwards,
/// so lookups take `&self` and may run from several threads.
///
/// # Example
///
/// ```no_run
/// use prosper_config::OptionResolver;
///
/// let config = OptionResolver::open("app.cfg")?;
///
/// // Runtime value equals the default: local file, then master, then 30.
/// let timeout = config.get_option("api", "timeout", 30, 30).into_text();
///
/// // A runtime value different from the default always wins.
/// let retries = config.get_option("api", "retries", 5, 3);
/// assert_eq!(retries.into_given(), Some(5));
///
/// // Text lookup with a fallback.
/// let host = config.get_str("api", "host", "localhost");
/// # Ok::<(), prosper_config::ConfigError>(())
/// ```
pub struct OptionResolver {
    config_filename: PathBuf,
    local_config_filename: PathBuf,
    global_config: ConfigDocument,
    local_config: Option<ConfigDocument>,
    logger: SharedLogger,
    debug_mode: bool,
}

impl OptionResolver {
    /// Load `config_filename` and its local sibling (or the override)
    ///
    /// Fails when the master file can't be read or parsed. A missing local
    /// file is reported on the process-wide warnings channel and leaves the
    /// local document absent. `debug_mode` is stored but changes nothing.
    pub fn new(
        config_filename: impl AsRef<Path>,
        local_filepath_override: Option<&Path>,
        logger: SharedLogger,
        debug_mode: bool,
    ) -> ConfigResult<Self> {
        let config_filename = config_filename.as_ref();
        let loaded = load_configs(config_filename, local_filepath_override)?;
        Ok(Self::from_loaded(config_filename, local_filepath_override, loaded, logger, debug_mode))
    }

    /// Load with a silent logger and no override
    pub fn open(config_filename: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::new(config_filename, None, Arc::new(NoOpLogger::new()), false)
    }

    /// Build from documents loaded elsewhere, e.g. via `load_configs_with`
    pub fn from_loaded(
        config_filename: impl AsRef<Path>,
        local_filepath_override: Option<&Path>,
        loaded: LoadedConfigs,
        logger: SharedLogger,
        debug_mode: bool,
    ) -> Self {
        let config_filename = config_filename.as_ref();
        let local_config_filename = match local_filepath_override {
            Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
            _ => local_config_filepath(config_filename, false),
        };

        Self {
            config_filename: config_filename.to_path_buf(),
            local_config_filename,
            global_config: loaded.global,
            local_config: loaded.local,
            logger,
            debug_mode,
        }
    }

    /// Pick the value for `(section_name, key_name)`
    ///
    /// `args_option` wins whenever it differs from `args_default`. A caller
    /// that explicitly passes a value equal to its default gets file values
    /// instead; use [`resolve`](Self::resolve) to avoid that ambiguity.
    pub fn get_option<T: PartialEq>(
        &self,
        section_name: &str,
        key_name: &str,
        args_option: T,
        args_default: T,
    ) -> ResolvedOption<T> {
        self.logger.debug("picking config");
        if args_option != args_default {
            self.logger.debug("-- using function args");
            return ResolvedOption::given(args_option, OptionSource::Runtime);
        }
        self.from_files(section_name, key_name, args_default)
    }

    /// Pick the value for `(section_name, key_name)`; `Some` always wins
    pub fn resolve<T>(
        &self,
        section_name: &str,
        key_name: &str,
        args_option: Option<T>,
        args_default: T,
    ) -> ResolvedOption<T> {
        self.logger.debug("picking config");
        if let Some(value) = args_option {
            self.logger.debug("-- using function args");
            return ResolvedOption::given(value, OptionSource::Runtime);
        }
        self.from_files(section_name, key_name, args_default)
    }

    /// Text lookup through local, master and `default`
    ///
    /// Presence-only keys give an empty string.
    pub fn get_str(&self, section_name: &str, key_name: &str, default: &str) -> String {
        match self.from_files(section_name, key_name, default).value {
            OptionValue::Given(value) => value.to_string(),
            OptionValue::Text(text) => text.unwrap_or_default(),
        }
    }

    /// Tiers 2 to 4
    ///
    /// A value whose references don't expand is reported and skipped.
    fn from_files<T>(&self, section_name: &str, key_name: &str, args_default: T) -> ResolvedOption<T> {
        match self.local_config.as_ref().map(|local| local.get(section_name, key_name)) {
            Some(Ok(Some(value))) => {
                self.logger.debug("-- using local config");
                return ResolvedOption::text(value, OptionSource::Local);
            }
            Some(Ok(None)) => log_debug!(self.logger, "{}.{} not found in local config", section_name, key_name),
            Some(Err(err)) => log_warn!(self.logger, "{}.{} unusable in local config: {}", section_name, key_name, err),
            None => log_debug!(self.logger, "{}.{} skipped: no local config loaded", section_name, key_name),
        }

        match self.global_config.get(section_name, key_name) {
            Ok(Some(value)) => {
                self.logger.debug("-- using global config");
                return ResolvedOption::text(value, OptionSource::Global);
            }
            Ok(None) => log_warn!(self.logger, "{}.{} not found in global config", section_name, key_name),
            Err(err) => log_warn!(self.logger, "{}.{} unusable in global config: {}", section_name, key_name, err),
        }

        self.logger.debug("-- using default argument");
        ResolvedOption::given(args_default, OptionSource::Default)
    }

    /// Replace the message sink; nothing else changes
    pub fn attach_logger(&mut self, logger: SharedLogger) {
        self.logger = logger;
    }

    pub fn config_filename(&self) -> &Path {
        &self.config_filename
    }

    pub fn local_config_filename(&self) -> &Path {
        &self.local_config_filename
    }

    pub fn global_config(&self) -> &ConfigDocument {
        &self.global_config
    }

    /// Local document; `None` when the file was missing at load time
    pub fn local_config(&self) -> Option<&ConfigDocument> {
        self.local_config.as_ref()
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }
}

impl std::fmt::Debug for OptionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionResolver")
            .field("config_filename", &self.config_filename)
            .field("local_config_filename", &self.local_config_filename)
            .field("has_local_config", &self.local_config.is_some())
            .field("debug_mode", &self.debug_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger};
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn fixture(master: &str, local: Option<&str>) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.cfg");
        fs::write(&path, master).unwrap();
        if let Some(local) = local {
            fs::write(dir.path().join("app_local.cfg"), local).unwrap();
        }
        (dir, path)
    }

    #[test]
    fn test_priority_order() {
        let (_dir, path) = fixture(
            "[api]\ntimeout = 30\nhost = tracked.example\n",
            Some("[api]\ntimeout = 5\n"),
        );
        let config = OptionResolver::open(&path).unwrap();

        let local = config.get_option("api", "timeout", None::<&str>, None);
        assert_eq!(local.source, OptionSource::Local);
        assert_eq!(local.as_text(), Some("5"));

        let global = config.get_option("api", "host", None::<&str>, None);
        assert_eq!(global.source, OptionSource::Global);
        assert_eq!(global.as_text(), Some("tracked.example"));

        let runtime = config.get_option("api", "timeout", Some(99), None);
        assert_eq!(runtime.source, OptionSource::Runtime);
        assert_eq!(runtime.value, OptionValue::Given(Some(99)));

        let default = config.get_option("api", "retries", 3, 3);
        assert_eq!(default.source, OptionSource::Default);
        assert_eq!(default.into_given(), Some(3));
    }

    #[test]
    fn test_default_equal_runtime_falls_through() {
        let (_dir, path) = fixture("[api]\ntimeout = 30\n", None);
        let config = OptionResolver::open(&path).unwrap();

        // Same value as the default is indistinguishable from "not given".
        let picked = config.get_option("api", "timeout", "10", "10");
        assert_eq!(picked.source, OptionSource::Global);
        assert_eq!(picked.as_text(), Some("30"));

        // The explicit form keeps it.
        let picked = config.resolve("api", "timeout", Some("10"), "10");
        assert_eq!(picked.source, OptionSource::Runtime);
        assert_eq!(picked.into_given(), Some("10"));
    }

    #[test]
    fn test_missing_local_falls_through() {
        let (_dir, path) = fixture("[api]\ntimeout = 30\n", None);
        let logger = Arc::new(MemoryLogger::new());
        let config = OptionResolver::new(&path, None, logger.clone(), false).unwrap();

        assert!(config.local_config().is_none());
        assert_eq!(config.local_config_filename(), path.as_path());
        assert_eq!(config.get_str("api", "timeout", "1"), "30");
        assert!(logger.contains("no local config loaded"));
    }

    #[test]
    fn test_presence_only_key_is_found() {
        let (_dir, path) = fixture("[flags]\nverbose\n", None);
        let config = OptionResolver::open(&path).unwrap();

        let flag = config.get_option("flags", "verbose", false, false);
        assert_eq!(flag.source, OptionSource::Global);
        assert_eq!(flag.value, OptionValue::Text(None));
        assert_eq!(config.get_str("flags", "verbose", "x"), "");
    }

    #[test]
    fn test_miss_messages() {
        let (_dir, path) = fixture("[api]\n", Some("[api]\n"));
        let logger = Arc::new(MemoryLogger::new());
        let config = OptionResolver::new(&path, None, logger.clone(), false).unwrap();

        let picked = config.resolve("api", "retries", None, 3);
        assert_eq!(picked.into_given(), Some(3));
        assert!(logger
            .messages(LogLevel::Debug)
            .contains(&"api.retries not found in local config".to_string()));
        assert_eq!(
            logger.messages(LogLevel::Warn),
            vec!["api.retries not found in global config"]
        );
        assert!(logger.contains("-- using default argument"));
    }

    #[test]
    fn test_unexpandable_values_fall_through() {
        let (_dir, path) = fixture(
            "[DEFAULT]\nurl = http://${host}/\n[prod]\nhost = example.com\n[api]\ntimeout = 30\n[db]\npassword = tracked\n",
            Some("[api]\ntimeout = 5\n[db]\npassword = pa$word\n"),
        );
        let logger = Arc::new(MemoryLogger::new());
        let config = OptionResolver::new(&path, None, logger.clone(), false).unwrap();

        assert_eq!(config.get_str("api", "timeout", "0"), "5");
        assert_eq!(config.get_str("prod", "url", ""), "http://example.com/");

        let password = config.resolve("db", "password", None, "fallback");
        assert_eq!(password.source, OptionSource::Global);
        assert_eq!(password.as_text(), Some("tracked"));

        let url = config.resolve("api", "url", None, "http://localhost/");
        assert_eq!(url.source, OptionSource::Default);

        let warnings = logger.messages(LogLevel::Warn);
        assert!(warnings.iter().any(|m| m.starts_with("db.password unusable in local config")));
        assert!(warnings.iter().any(|m| m.starts_with("api.url unusable in global config")));
    }

    #[test]
    fn test_silent_sink_skips_message_formatting() {
        struct Counting(std::sync::atomic::AtomicUsize);
        impl crate::logging::Logger for Counting {
            fn log(&self, _level: LogLevel, _message: &str) {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
            fn enabled(&self, _level: LogLevel) -> bool {
                false
            }
        }

        let (_dir, path) = fixture("[api]\n", None);
        let sink = Arc::new(Counting(Default::default()));
        let config = OptionResolver::new(&path, None, sink.clone(), false).unwrap();

        config.resolve("api", "retries", None, 3);
        // Only the fixed strings reach `log`; the formatted miss messages are skipped.
        assert_eq!(sink.0.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_new_reports_missing_local_on_global_channel() {
        let (dir, path) = fixture("[api]\ntimeout = 30\n", None);
        let sink = Arc::new(MemoryLogger::new());
        let _subscription = crate::logging::GlobalLogger::subscribe(sink.clone());

        OptionResolver::open(&path).unwrap();
        let expected = format!("No {} found in path", dir.path().join("app_local.cfg").display());
        assert!(sink.messages(LogLevel::Warn).contains(&expected));
    }

    #[test]
    fn test_attach_logger() {
        let (_dir, path) = fixture("[api]\ntimeout = 30\n", None);
        let first = Arc::new(MemoryLogger::new());
        let second = Arc::new(MemoryLogger::new());
        let mut config = OptionResolver::new(&path, None, first.clone(), true).unwrap();

        config.attach_logger(second.clone());
        config.get_str("api", "timeout", "");

        assert!(first.records().is_empty());
        assert!(!second.records().is_empty());
        assert!(config.debug_mode());
    }

    #[test]
    fn test_into_text() {
        let (_dir, path) = fixture("[api]\ntimeout = 30\n", None);
        let config = OptionResolver::open(&path).unwrap();

        assert_eq!(config.get_option("api", "timeout", 0, 0).into_text(), Some("30".to_string()));
        assert_eq!(config.get_option("api", "port", 0, 8080).into_text(), Some("0".to_string()));
        assert_eq!(config.get_option("api", "port", 8080, 8080).into_text(), Some("8080".to_string()));
    }

    #[test]
    fn test_source_names() {
        assert_eq!(OptionSource::Global.to_string(), "global");
        assert_eq!(serde_json::to_string(&OptionSource::Local).unwrap(), "\"local\"");
    }

    #[test]
    fn test_resolver_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OptionResolver>();
    }
}
