//! Errors raised while loading config files

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::document::ParseError;

/// Errors that can occur while loading a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl ConfigError {
    /// Classify an I/O failure on `path`
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Whether the file simply wasn't there
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }

    /// Path of the file that failed to load
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::NotFound { path } | ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
