//! Python bindings for prosper-config via PyO3

use std::path::Path;
use std::sync::Arc;

use pyo3::exceptions::{PyFileNotFoundError, PyOSError, PyValueError};
use pyo3::prelude::*;

use prosper_config::{
    local_config_filepath, ConfigError, ConsoleLogger, GlobalLogger, LogLevel, Logger,
    NoOpLogger, OptionResolver, OptionValue, SharedLogger,
};

fn to_py_err(err: ConfigError) -> PyErr {
    match err {
        ConfigError::NotFound { .. } => PyFileNotFoundError::new_err(err.to_string()),
        ConfigError::Io { .. } => PyOSError::new_err(err.to_string()),
        ConfigError::Parse { .. } => PyValueError::new_err(err.to_string()),
    }
}

// ============================================================================
// Python logger adapter
// ============================================================================

/// Forwards messages to a Python `logging.Logger`-like object
struct PyLogger {
    target: Py<PyAny>,
}

impl Logger for PyLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let method = match level {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warning",
            LogLevel::Error => "error",
        };
        // A failing handler must not break resolution.
        Python::with_gil(|py| {
            let _ = self.target.call_method1(py, method, (message,));
        });
    }
}

fn shared_logger(logger: Option<PyObject>) -> SharedLogger {
    match logger {
        Some(target) => Arc::new(PyLogger { target }),
        None => NoOpLogger::shared(),
    }
}

// ============================================================================
// ProsperConfig
// ============================================================================

/// Layered config: runtime args > <name>_local.cfg > <name>.cfg > defaults
#[pyclass]
pub struct ProsperConfig {
    inner: OptionResolver,
}

#[pymethods]
impl ProsperConfig {
    #[new]
    #[pyo3(signature = (config_filename, local_filepath_override=None, logger=None, debug_mode=false))]
    pub fn new(
        config_filename: String,
        local_filepath_override: Option<String>,
        logger: Option<PyObject>,
        debug_mode: bool,
    ) -> PyResult<Self> {
        let inner = OptionResolver::new(
            &config_filename,
            local_filepath_override.as_deref().map(Path::new),
            shared_logger(logger),
            debug_mode,
        )
        .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Pick a value: `args_option` when it differs from `args_default`
    /// (Python `!=`), else the local file, the master file, `args_default`.
    #[pyo3(signature = (section_name, key_name, args_option=None, args_default=None))]
    pub fn get_option(
        &self,
        py: Python<'_>,
        section_name: &str,
        key_name: &str,
        args_option: Option<PyObject>,
        args_default: Option<PyObject>,
    ) -> PyResult<PyObject> {
        let args_option = args_option.unwrap_or_else(|| py.None());
        let args_default = args_default.unwrap_or_else(|| py.None());

        let runtime = if args_option.bind(py).ne(args_default.bind(py))? {
            Some(args_option)
        } else {
            None
        };

        match self.inner.resolve(section_name, key_name, runtime, args_default).value {
            OptionValue::Given(value) => Ok(value),
            OptionValue::Text(Some(text)) => Ok(text.into_pyobject(py)?.into_any().unbind()),
            OptionValue::Text(None) => Ok(py.None()),
        }
    }

    /// Route resolution messages to a Python logger (`None` silences them)
    pub fn attach_logger(&mut self, logger: Option<PyObject>) {
        self.inner.attach_logger(shared_logger(logger));
    }

    /// Route resolution messages to stderr
    #[pyo3(signature = (prefix=None))]
    pub fn attach_console_logger(&mut self, prefix: Option<String>) {
        let logger = match prefix {
            Some(prefix) => ConsoleLogger::with_prefix(prefix),
            None => ConsoleLogger::new(),
        };
        self.inner.attach_logger(Arc::new(logger));
    }

    /// Route resolution messages to the shared debug log file
    pub fn attach_file_logger(&mut self) {
        self.inner.attach_logger(Arc::new(GlobalLogger::new("prosper_common")));
    }

    /// Silence resolution messages
    pub fn detach_logger(&mut self) {
        self.inner.attach_logger(NoOpLogger::shared());
    }

    #[getter]
    pub fn config_filename(&self) -> String {
        self.inner.config_filename().to_string_lossy().into_owned()
    }

    #[getter]
    pub fn local_config_filename(&self) -> String {
        self.inner.local_config_filename().to_string_lossy().into_owned()
    }

    #[getter]
    pub fn has_local_config(&self) -> bool {
        self.inner.local_config().is_some()
    }

    #[getter]
    pub fn debug_mode(&self) -> bool {
        self.inner.debug_mode()
    }

    /// Both loaded documents as JSON, for inspection
    pub fn dump(&self) -> PyResult<(String, Option<String>)> {
        let global = self
            .inner
            .global_config()
            .to_json()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let local = self
            .inner
            .local_config()
            .map(|doc| doc.to_json())
            .transpose()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok((global, local))
    }

    fn __repr__(&self) -> String {
        format!(
            "ProsperConfig(config_filename='{}', local_config_filename='{}', has_local_config={})",
            self.config_filename(),
            self.local_config_filename(),
            self.has_local_config()
        )
    }
}

// ============================================================================
// Functions
// ============================================================================

/// `name.cfg` -> `name_local.cfg` when that file exists (or when forced)
#[pyfunction]
#[pyo3(signature = (config_filepath, force_local=false))]
fn get_local_config_filepath(config_filepath: &str, force_local: bool) -> String {
    local_config_filepath(config_filepath, force_local)
        .to_string_lossy()
        .into_owned()
}

#[pymodule]
fn prosper_common(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ProsperConfig>()?;
    m.add_function(wrap_pyfunction!(get_local_config_filepath, m)?)?;
    Ok(())
}
