//! Error types for the Package Manager.

use std::io;
use std::path::PathBuf;

use crate::package::ManifestError;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors that can occur during package management operations.
#[derive(Debug)]
pub enum ManagerError {
    /// Failed to read a file or directory.
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file or directory.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to delete a file.
    RemoveFailed { path: PathBuf, source: io::Error },

    /// Failed to move a staged download into place.
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Failed to fetch the package manifest.
    ManifestFetchFailed { url: String, reason: String },

    /// Failed to parse the package manifest.
    ManifestParseFailed { url: String, source: ManifestError },

    /// Failed to download a package file.
    DownloadFailed { url: String, reason: String },

    /// HTTP client could not be created or used.
    HttpError(String),

    /// Network timeout.
    Timeout { url: String, timeout_secs: u64 },

    /// Packaging source directory does not exist.
    SourceNotFound(PathBuf),

    /// Invalid configuration.
    InvalidConfig(String),

    /// The operation was cancelled by the caller.
    Cancelled,
}

impl ManagerError {
    /// Whether this error is a cooperative cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for ManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            Self::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::RemoveFailed { path, source } => {
                write!(f, "failed to delete {}: {}", path.display(), source)
            }
            Self::RenameFailed { from, to, source } => {
                write!(
                    f,
                    "failed to move {} to {}: {}",
                    from.display(),
                    to.display(),
                    source
                )
            }
            Self::ManifestFetchFailed { url, reason } => {
                write!(
                    f,
                    "failed to fetch package manifest from {}: {}",
                    url, reason
                )
            }
            Self::ManifestParseFailed { url, source } => {
                write!(
                    f,
                    "failed to parse package manifest from {}: {}",
                    url, source
                )
            }
            Self::DownloadFailed { url, reason } => {
                write!(f, "failed to download {}: {}", url, reason)
            }
            Self::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            Self::Timeout { url, timeout_secs } => {
                write!(f, "request to {} timed out after {}s", url, timeout_secs)
            }
            Self::SourceNotFound(path) => {
                write!(f, "source directory does not exist: {}", path.display())
            }
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Self::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl std::error::Error for ManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailed { source, .. } => Some(source),
            Self::WriteFailed { source, .. } => Some(source),
            Self::CreateDirFailed { source, .. } => Some(source),
            Self::RemoveFailed { source, .. } => Some(source),
            Self::RenameFailed { source, .. } => Some(source),
            Self::ManifestParseFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
