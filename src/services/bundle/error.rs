//! Statement bundle error types

use std::path::PathBuf;
use thiserror::Error;
use zip::result::ZipError;

/// Errors that can occur while loading a statement bundle
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Failed to read bundle file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a valid bundle archive: {0}")]
    ArchiveRead(#[source] ZipError),

    #[error("Failed to read bundle entry {entry}: {source}")]
    EntryRead {
        entry: String,
        #[source]
        source: ZipError,
    },
}

/// Result type alias for bundle operations
pub type BundleResult<T> = Result<T, BundleError>;
