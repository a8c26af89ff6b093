//! Error types for release-file

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a property file
#[derive(Error, Debug)]
pub enum ReleaseFileError {
    /// The path exists but is not a regular file
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// IO error while reading the file
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReleaseFileError {
    /// Whether the error just means "the file is not there"
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReleaseFileError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
