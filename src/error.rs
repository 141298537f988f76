//! Error types for the versioning core and the tooling layer on top of it.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by nodes, revisions, branches and repositories.
///
/// The core never swallows these; the only internal recovery path is the
/// rollback in [`crate::repository::Repository::checkout`], which re-raises
/// the original failure after restoring the backup.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("no such revision: {0}")]
    NoSuchRevision(i64),

    #[error("no such branch: {0}")]
    NoSuchBranch(String),

    #[error("branch already exists: {0}")]
    BranchExists(String),

    #[error("the default branch cannot be removed: {0}")]
    DefaultBranchRemoval(String),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("corrupt or incompatible data in {}: {details}", location.display())]
    CorruptOrIncompatibleData { location: PathBuf, details: String },

    #[error("I/O failure at {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RepoError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        RepoError::IoFailure {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn corrupt(location: impl AsRef<Path>, details: impl Into<String>) -> Self {
        RepoError::CorruptOrIncompatibleData {
            location: location.as_ref().to_path_buf(),
            details: details.into(),
        }
    }
}

/// Errors surfaced by the command layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Usage(String),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl ApiError {
    pub fn usage(message: impl Into<String>) -> Self {
        ApiError::Usage(message.into())
    }
}
