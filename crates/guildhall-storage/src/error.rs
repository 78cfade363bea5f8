//! Storage error types.

use std::path::{Path, PathBuf};

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A file the store expected does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading, writing or listing a file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A file's contents could not be encoded or decoded.
    #[error("serialization error at {}: {source}", path.display())]
    Serialization {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Every ID has been issued; nothing more can be added.
    #[error("entry ID space exhausted in {}", .0.display())]
    IdSpaceExhausted(PathBuf),

    /// The store was configured with an unusable page size.
    #[error("invalid page size: {0}")]
    InvalidPageSize(usize),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    pub(crate) fn serialization(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.into(),
            source,
        }
    }

    /// The file this error concerns, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(path)
            | Self::IdSpaceExhausted(path)
            | Self::Io { path, .. }
            | Self::Serialization { path, .. } => Some(path),
            Self::InvalidPageSize(_) => None,
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
