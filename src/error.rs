//! Error taxonomy for storage and tracker operations.
//!
//! Corruption is not an error: unreadable data files are recovered
//! by [`crate::recovery`] and reported through [`crate::recovery::LoadOutcome`].

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures of the storage layer. On any of these the files on disk keep
/// their pre-write content.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        StorageError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A record failed a field rule and was not written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A task mutation conflicts with the dependency graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DependencyError {
    #[error("Adding dependency '{dependency}' would create a circular dependency")]
    Cycle { dependency: String },

    #[error("Cannot complete task: waiting on {}", titles.join(", "))]
    Incomplete { titles: Vec<String> },
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Dependency error: {0}")]
    Dependency(#[from] DependencyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TrackerError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        TrackerError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
