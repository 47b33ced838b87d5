//! Local state scanning against a manifest.
//!
//! A file is in sync when its size and SHA-256 digest both match its manifest
//! entry. Modification times are never consulted, so copies that rewrite
//! timestamps and partial writes from an interrupted run are handled alike:
//! anything that does not match is simply fetched again.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use super::download::calculate_file_checksum;
use super::error::{ManagerError, ManagerResult};
use crate::package::{FileEntry, PackageManifest};

/// Check whether `entry` is installed under `root` with the expected content.
///
/// The size is compared first so mismatched files are rejected without being
/// hashed. Only reads the filesystem.
pub fn is_installed(entry: &FileEntry, root: &Path) -> ManagerResult<bool> {
    let path = entry.local_path(root);

    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(ManagerError::ReadFailed {
                path,
                source: e,
            })
        }
    };

    if !metadata.is_file() {
        return Ok(false);
    }

    if metadata.len() != entry.size {
        trace!(
            path = %path.display(),
            expected = entry.size,
            actual = metadata.len(),
            "size mismatch"
        );
        return Ok(false);
    }

    let actual = calculate_file_checksum(&path)?;
    Ok(actual == entry.sha256)
}

/// Find every file under `root` that is not part of `manifest`.
///
/// Paths are compared exactly against each entry resolved under `root`. A
/// missing root has no extraneous files.
pub fn find_extraneous(manifest: &PackageManifest, root: &Path) -> ManagerResult<BTreeSet<PathBuf>> {
    if !root.exists() {
        return Ok(BTreeSet::new());
    }

    let package_files: HashSet<PathBuf> = manifest
        .files
        .iter()
        .map(|f| f.local_path(root))
        .collect();

    let mut extraneous = BTreeSet::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            ManagerError::ReadFailed {
                path,
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "directory walk failed")),
            }
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        if !package_files.contains(entry.path()) {
            extraneous.insert(entry.into_path());
        }
    }

    Ok(extraneous)
}
