//! Log loading
//!
//! Reads whole access-log batches from disk. Detection only ever sees fully
//! parsed records: any I/O or syntax problem aborts the load.

pub mod json_loader;

pub use json_loader::JsonLoader;

use crate::models::LogRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading logs or configuration
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unable to read file: {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in file: {} - {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid TOML in file: {} - {source}", .path.display())]
    InvalidToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Source of access-log batches
///
/// Implementations return the complete batch or an error, never a partial one.
pub trait LogLoader {
    fn load(&self, source: &Path) -> Result<Vec<LogRecord>, LoadError>;
}

/// Read a file to a string, separating "missing" from "unreadable"
pub(crate) fn read_source(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}
