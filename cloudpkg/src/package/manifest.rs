//! Package manifest model and JSON parsing.
//!
//! A manifest lists every file of one package version together with its exact
//! size and SHA-256 digest. It is published as `package.json` next to the
//! per-version blob directory:
//!
//! ```json
//! {
//!   "Name": "demo",
//!   "Version": "1",
//!   "Files": [
//!     { "RelativePath": "a/b.txt", "FileSize": 5, "SHA256": "2CF24DBA..." }
//!   ]
//! }
//! ```
//!
//! Parsing validates the structural invariants the installer relies on:
//! relative paths stay inside the install root and are unique, and digests
//! are 64 hex digits. Digests are normalized to uppercase.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a hex-encoded SHA-256 digest.
const SHA256_HEX_LEN: usize = 64;

/// UTF-8 byte order mark some publishing tools prepend to JSON files.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors raised while parsing or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The payload is not valid manifest JSON.
    #[error("malformed manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest carries no version tag.
    #[error("manifest version is empty")]
    EmptyVersion,

    /// A file path would resolve outside the install root.
    #[error("invalid file path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The same relative path is listed more than once.
    #[error("duplicate file path '{0}'")]
    DuplicatePath(String),

    /// A digest is not a hex-encoded SHA-256 value.
    #[error("invalid SHA-256 digest '{digest}' for '{path}'")]
    InvalidDigest { path: String, digest: String },
}

/// One file of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Forward-slash separated path relative to the install root.
    #[serde(rename = "RelativePath")]
    pub relative_path: String,

    /// Exact size of the installed file in bytes.
    #[serde(rename = "FileSize")]
    pub size: u64,

    /// Uppercase hex SHA-256 of the installed file's bytes.
    #[serde(rename = "SHA256")]
    pub sha256: String,
}

impl FileEntry {
    /// Create a new file entry.
    ///
    /// The digest is normalized to uppercase.
    pub fn new(relative_path: impl Into<String>, size: u64, sha256: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            size,
            sha256: sha256.into().to_ascii_uppercase(),
        }
    }

    /// Resolve this entry's location under `root`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::Path;
    /// use cloudpkg::package::FileEntry;
    ///
    /// let entry = FileEntry::new("a/b.txt", 5, "00");
    /// assert_eq!(entry.local_path(Path::new("/opt/app")), Path::new("/opt/app/a/b.txt"));
    /// ```
    pub fn local_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.relative_path.split('/') {
            path.push(segment);
        }
        path
    }

    fn validate(&self) -> Result<(), ManifestError> {
        let invalid = |reason| ManifestError::InvalidPath {
            path: self.relative_path.clone(),
            reason,
        };

        if self.relative_path.is_empty() {
            return Err(invalid("path is empty"));
        }
        if self.relative_path.starts_with('/') || Path::new(&self.relative_path).is_absolute() {
            return Err(invalid("path is absolute"));
        }
        for segment in self.relative_path.split('/') {
            match segment {
                "" => return Err(invalid("path has an empty segment")),
                "." | ".." => return Err(invalid("path has a relative segment")),
                _ if segment.contains('\\') => return Err(invalid("path has a backslash")),
                _ => {}
            }
            // a segment must map to exactly one plain file name on this host
            let mut components = Path::new(segment).components();
            if !matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            ) {
                return Err(invalid("path has a non-normal segment"));
            }
        }

        if self.sha256.len() != SHA256_HEX_LEN
            || !self.sha256.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(ManifestError::InvalidDigest {
                path: self.relative_path.clone(),
                digest: self.sha256.clone(),
            });
        }

        Ok(())
    }
}

/// A versioned package description.
///
/// Immutable for the duration of one install or uninstall; orchestrators only
/// ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Informational package name.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    /// Opaque version tag used to build the blob directory name.
    #[serde(rename = "Version")]
    pub version: String,

    /// Files in publication order.
    #[serde(rename = "Files", default)]
    pub files: Vec<FileEntry>,
}

impl PackageManifest {
    /// Create an empty manifest.
    pub fn new(name: Option<String>, version: impl Into<String>) -> Self {
        Self {
            name,
            version: version.into(),
            files: Vec::new(),
        }
    }

    /// Sum of every file size.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Number of files in the package.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Check structural invariants and normalize digests to uppercase.
    pub fn validate(&mut self) -> Result<(), ManifestError> {
        if self.version.trim().is_empty() {
            return Err(ManifestError::EmptyVersion);
        }

        for file in &mut self.files {
            file.sha256.make_ascii_uppercase();
        }

        let mut seen = HashSet::with_capacity(self.files.len());
        for file in &self.files {
            file.validate()?;
            if !seen.insert(file.relative_path.as_str()) {
                return Err(ManifestError::DuplicatePath(file.relative_path.clone()));
            }
        }

        Ok(())
    }
}

/// Parse and validate a manifest from raw JSON bytes.
pub fn parse_manifest(bytes: &[u8]) -> Result<PackageManifest, ManifestError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut manifest: PackageManifest = serde_json::from_slice(bytes)?;
    manifest.validate()?;
    Ok(manifest)
}

/// Serialize a manifest as indented JSON.
pub fn serialize_manifest(manifest: &PackageManifest) -> Result<String, ManifestError> {
    Ok(serde_json::to_string_pretty(manifest)?)
}
