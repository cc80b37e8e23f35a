// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MystError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Target file {file:?} is out of the root directory {root:?}")]
    OutsideRoot { file: PathBuf, root: PathBuf },

    #[error("Extension error: {0}")]
    Extension(String),

    #[error("Template error in {path:?}: {message}")]
    Template { path: PathBuf, message: String },

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MystError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        MystError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(path: impl AsRef<Path>, message: impl ToString) -> Self {
        MystError::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn template(path: impl AsRef<Path>, message: impl ToString) -> Self {
        MystError::Template {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// True if this is an IO error whose kind is `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MystError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MystError>;
