//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config or preset file could not be read, written, or given a
    /// parent directory.
    #[error("failed to {action} '{path}': {source}")]
    Io {
        /// What was being attempted, e.g. "read file".
        action: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Preset not found
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// The config is well-formed but describes an invalid combination.
    #[error("invalid configuration: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// A file could not be read.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io("read file", path, source)
    }

    /// A file could not be written.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io("write file", path, source)
    }

    /// A parent directory could not be created.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io("create directory", path, source)
    }

    /// Path of the file involved, for I/O failures.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ConfigError::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}
