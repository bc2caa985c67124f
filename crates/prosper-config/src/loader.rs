//! Dual-file loading: tracked master config plus optional local override
//!
//! `app.cfg` is the tracked file shipped with the application. Deployments may
//! add `app_local.cfg` next to it for secrets and machine-specific values.
//! The master must load; the local file may be missing.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::document::{ConfigDocument, ParserOptions};
use crate::error::ConfigResult;
use crate::log_warn;
use crate::logging::{GlobalLogger, Logger};

/// Extension token that marks a master config file
pub const MASTER_SUFFIX: &str = ".cfg";

/// What `MASTER_SUFFIX` becomes in the derived local filename
pub const LOCAL_SUFFIX: &str = "_local.cfg";

/// Derive the local config path for `config_filepath`
///
/// Every `.cfg` in the path is replaced with `_local.cfg` (plain substring
/// replacement). The derived path is returned when it exists as a file or
/// when `force_local` is set; otherwise the master path comes back unchanged.
pub fn local_config_filepath(config_filepath: impl AsRef<Path>, force_local: bool) -> PathBuf {
    let config_filepath = config_filepath.as_ref();
    let local = replace_suffix(config_filepath);

    if force_local || local.is_file() {
        local
    } else {
        config_filepath.to_path_buf()
    }
}

/// Substring replacement on the raw path bytes, so non-UTF-8 paths survive
fn replace_suffix(path: &Path) -> PathBuf {
    let bytes = path.as_os_str().as_encoded_bytes();
    let (from, to) = (MASTER_SUFFIX.as_bytes(), LOCAL_SUFFIX.as_bytes());

    let mut out = Vec::with_capacity(bytes.len() + to.len());
    let mut rest = bytes;
    while let Some(at) = rest.windows(from.len()).position(|window| window == from) {
        out.extend_from_slice(&rest[..at]);
        out.extend_from_slice(to);
        rest = &rest[at + from.len()..];
    }
    out.extend_from_slice(rest);

    // SAFETY: `out` is the original encoded bytes with one ASCII substring
    // swapped for another; every split point sits next to ASCII text.
    PathBuf::from(unsafe { OsString::from_encoded_bytes_unchecked(out) })
}

/// Both documents of one logical configuration
#[derive(Debug, Clone)]
pub struct LoadedConfigs {
    /// Tracked master document
    pub global: ConfigDocument,
    /// Local override document; `None` when the file was not there
    pub local: Option<ConfigDocument>,
    /// Path the local document was (or would have been) read from
    pub local_path: PathBuf,
}

/// Load master and local documents, reporting to the process-wide channel
pub fn load_configs(
    config_filepath: impl AsRef<Path>,
    local_filepath_override: Option<&Path>,
) -> ConfigResult<LoadedConfigs> {
    load_configs_with(
        config_filepath,
        local_filepath_override,
        &GlobalLogger::new("prosper_config::loader"),
    )
}

/// Load master and local documents, reporting a missing local file to `warnings`
///
/// Any failure on the master file is returned. For the local file only a
/// missing file is tolerated; it yields `local: None` and one warning.
pub fn load_configs_with(
    config_filepath: impl AsRef<Path>,
    local_filepath_override: Option<&Path>,
    warnings: &dyn Logger,
) -> ConfigResult<LoadedConfigs> {
    let config_filepath = config_filepath.as_ref();
    let options = ParserOptions::prosper();

    let global = ConfigDocument::from_path(config_filepath, &options)?;

    let local_path = match local_filepath_override {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => local_config_filepath(config_filepath, true),
    };

    let local = match ConfigDocument::from_path(&local_path, &options) {
        Ok(doc) => Some(doc),
        Err(err) if err.is_not_found() => {
            log_warn!(warnings, "No {} found in path", local_path.display());
            None
        }
        Err(err) => return Err(err),
    };

    Ok(LoadedConfigs {
        global,
        local,
        local_path,
    })
}

/// Load a single document: the local file when present, else the master
///
/// With `local_override` set the master file is read regardless.
#[deprecated(since = "0.3.0", note = "use OptionResolver, which keeps master and local documents apart")]
pub fn get_config(config_filepath: impl AsRef<Path>, local_override: bool) -> ConfigResult<ConfigDocument> {
    let config_filepath = config_filepath.as_ref();
    log_warn!(
        GlobalLogger::new("prosper_config::loader"),
        "get_config is deprecated and replaced with OptionResolver (loading {})",
        config_filepath.display()
    );

    let real_config_filepath = if local_override {
        config_filepath.to_path_buf()
    } else {
        local_config_filepath(config_filepath, false)
    };

    ConfigDocument::from_path(real_config_filepath, &ParserOptions::prosper())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::logging::{LogLevel, MemoryLogger};
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_local_path_derivation() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("config.cfg");
        let local = dir.path().join("config_local.cfg");

        assert_eq!(local_config_filepath(&master, false), master);
        assert_eq!(local_config_filepath(&master, true), local);

        fs::write(&local, "[a]\n").unwrap();
        assert_eq!(local_config_filepath(&master, false), local);
    }

    #[test]
    fn test_local_path_is_naive_substring_replace() {
        assert_eq!(
            local_config_filepath("/etc/app.cfg.d/app.cfg", true),
            PathBuf::from("/etc/app_local.cfg.d/app_local.cfg")
        );
        assert_eq!(local_config_filepath("settings.ini", true), PathBuf::from("settings.ini"));
    }

    #[test]
    fn test_load_both() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("app.cfg");
        fs::write(&master, "[api]\ntimeout = 30\n").unwrap();
        fs::write(dir.path().join("app_local.cfg"), "[api]\ntimeout = 5\n").unwrap();

        let warnings = MemoryLogger::new();
        let loaded = load_configs_with(&master, None, &warnings).unwrap();
        assert_eq!(loaded.global.get_str("api", "timeout").unwrap().as_deref(), Some("30"));
        assert_eq!(loaded.local.unwrap().get_str("api", "timeout").unwrap().as_deref(), Some("5"));
        assert_eq!(loaded.local_path, dir.path().join("app_local.cfg"));
        assert!(warnings.records().is_empty());
    }

    #[test]
    fn test_missing_local_is_absent_with_warning() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("app.cfg");
        fs::write(&master, "[api]\ntimeout = 30\n").unwrap();

        let warnings = MemoryLogger::new();
        let loaded = load_configs_with(&master, None, &warnings).unwrap();
        assert!(loaded.local.is_none());
        assert_eq!(warnings.count(LogLevel::Warn), 1);
        assert!(warnings.contains("app_local.cfg"));
    }

    #[test]
    fn test_empty_local_is_not_absent() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("app.cfg");
        fs::write(&master, "[api]\ntimeout = 30\n").unwrap();
        fs::write(dir.path().join("app_local.cfg"), "").unwrap();

        let loaded = load_configs_with(&master, None, &MemoryLogger::new()).unwrap();
        assert!(loaded.local.is_some_and(|doc| doc.is_empty()));
    }

    #[test]
    fn test_override_path_used_verbatim() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("app.cfg");
        let secrets = dir.path().join("secrets.txt");
        fs::write(&master, "[api]\nkey = public\n").unwrap();
        fs::write(dir.path().join("app_local.cfg"), "[api]\nkey = ignored\n").unwrap();
        fs::write(&secrets, "[api]\nkey = private\n").unwrap();

        let loaded = load_configs_with(&master, Some(secrets.as_path()), &MemoryLogger::new()).unwrap();
        assert_eq!(loaded.local_path, secrets);
        assert_eq!(loaded.local.unwrap().get_str("api", "key").unwrap().as_deref(), Some("private"));
    }

    #[test]
    fn test_master_failures_are_fatal() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("app.cfg");

        let err = load_configs_with(&master, None, &MemoryLogger::new()).unwrap_err();
        assert!(err.is_not_found());

        fs::write(&master, "no header = here\n").unwrap();
        let err = load_configs_with(&master, None, &MemoryLogger::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_broken_local_layout_is_fatal() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("app.cfg");
        fs::write(&master, "[api]\n").unwrap();
        fs::write(dir.path().join("app_local.cfg"), "key = no header\n").unwrap();

        let err = load_configs_with(&master, None, &MemoryLogger::new()).unwrap_err();
        assert_eq!(err.path(), dir.path().join("app_local.cfg"));
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_bad_references_do_not_fail_the_load() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("app.cfg");
        fs::write(
            &master,
            "[DEFAULT]\nurl = http://${host}/\n[prod]\nhost = example.com\n[api]\ntimeout = 30\n",
        )
        .unwrap();
        fs::write(dir.path().join("app_local.cfg"), "[api]\ntimeout = 5\n[db]\npassword = pa$word\n").unwrap();

        let loaded = load_configs_with(&master, None, &MemoryLogger::new()).unwrap();
        assert_eq!(loaded.global.get_str("api", "timeout").unwrap().as_deref(), Some("30"));
        assert_eq!(loaded.global.get_str("prod", "url").unwrap().as_deref(), Some("http://example.com/"));

        let local = loaded.local.unwrap();
        assert_eq!(local.get_str("api", "timeout").unwrap().as_deref(), Some("5"));
        assert!(local.get("db", "password").is_err());
    }

    #[test]
    fn test_missing_local_reported_on_global_channel() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("app.cfg");
        fs::write(&master, "[api]\ntimeout = 30\n").unwrap();

        let sink = Arc::new(MemoryLogger::new());
        let _subscription = GlobalLogger::subscribe(sink.clone());
        let loaded = load_configs(&master, None).unwrap();

        assert!(loaded.local.is_none());
        let expected = format!("No {} found in path", dir.path().join("app_local.cfg").display());
        assert!(sink.messages(LogLevel::Warn).contains(&expected));
    }

    #[cfg(unix)]
    #[test]
    fn test_local_path_keeps_non_utf8_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let master = Path::new(OsStr::from_bytes(b"/tmp/\xffapp.cfg"));
        let local = local_config_filepath(master, true);
        assert_eq!(local.as_os_str().as_bytes(), b"/tmp/\xffapp_local.cfg");
    }

    #[test]
    #[allow(deprecated)]
    fn test_legacy_get_config() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("app.cfg");
        fs::write(&master, "[api]\ntimeout = 30\n").unwrap();

        // No local file yet: falls back to the master.
        let doc = get_config(&master, false).unwrap();
        assert_eq!(doc.get_str("api", "timeout").unwrap().as_deref(), Some("30"));

        fs::write(dir.path().join("app_local.cfg"), "[api]\ntimeout = 5\n").unwrap();
        assert_eq!(get_config(&master, false).unwrap().get_raw("api", "timeout"), Some(Some("5")));
        assert_eq!(get_config(&master, true).unwrap().get_raw("api", "timeout"), Some(Some("30")));
    }

    #[test]
    #[allow(deprecated)]
    fn test_legacy_get_config_warns() {
        let dir = tempdir().unwrap();
        let master = dir.path().join("app.cfg");
        fs::write(&master, "[api]\ntimeout = 30\n").unwrap();

        let sink = Arc::new(MemoryLogger::new());
        let _subscription = GlobalLogger::subscribe(sink.clone());
        get_config(&master, true).unwrap();

        let expected = format!(
            "get_config is deprecated and replaced with OptionResolver (loading {})",
            master.display()
        );
        assert!(sink.messages(LogLevel::Warn).contains(&expected));
    }
}
