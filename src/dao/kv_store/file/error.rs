//! Error types shared by the JSON file store implementation.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias returning [`FileStoreError`] failures.
pub type FileStoreResult<T> = Result<T, FileStoreError>;

/// Failures that can occur while reading or writing the store document.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// The directory holding the document could not be created.
    #[error("failed to create store directory `{}`", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading the document failed for a reason other than absence.
    #[error("failed to read store document `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing or replacing the document failed.
    #[error("failed to write store document `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document exists but is not valid JSON.
    #[error("failed to parse store document `{}`", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The document is valid JSON but its root is not an object.
    #[error("store document `{}` is not a JSON object", path.display())]
    NotAnObject { path: PathBuf },
    /// Serialising the updated document failed.
    #[error("failed to encode store document")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}
