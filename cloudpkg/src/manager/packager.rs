//! Package publishing.
//!
//! Turns a source directory into the layout the installer consumes:
//!
//! ```text
//! output/
//! ├── package.json          manifest (name, version, files)
//! └── v{version}/
//!     └── <relative path>.dpcp  one blob per source file
//! ```

use std::fs;
use std::io;
use std::path::{Component, Path};

use chrono::{Datelike, Timelike, Utc};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::download::calculate_file_checksum;
use super::error::{ManagerError, ManagerResult};
use crate::package::{
    blob_filename, serialize_manifest, version_dir_name, FileEntry, PackageManifest,
    MANIFEST_FILENAME,
};

/// Build a publishable package from `source` into `output`.
///
/// An existing `output` directory is deleted first. When `version` is absent,
/// one is derived from the current UTC time as
/// `year.month.day.minute-of-day`.
///
/// # Errors
///
/// Returns [`ManagerError::SourceNotFound`] when `source` is not a directory,
/// and I/O errors for anything that cannot be read or written.
pub fn create_package(
    source: &Path,
    output: &Path,
    name: Option<&str>,
    version: Option<&str>,
) -> ManagerResult<PackageManifest> {
    if !source.is_dir() {
        return Err(ManagerError::SourceNotFound(source.to_path_buf()));
    }
    if output.starts_with(source) {
        return Err(ManagerError::InvalidConfig(format!(
            "output directory {} is inside the source directory",
            output.display()
        )));
    }

    let version = match version.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.to_string(),
        None => {
            let generated = timestamp_version();
            warn!(version = %generated, "no version given, using timestamp version");
            generated
        }
    };

    if output.exists() {
        fs::remove_dir_all(output).map_err(|e| ManagerError::RemoveFailed {
            path: output.to_path_buf(),
            source: e,
        })?;
    }

    let version_dir = output.join(version_dir_name(&version));
    create_dir(&version_dir)?;

    let mut manifest = PackageManifest::new(name.map(str::to_string), version);

    let walker = WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| ManagerError::ReadFailed {
            path: e.path().unwrap_or(source).to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "directory walk failed")),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative_path = relative_path(source, entry.path())?;
        let size = entry
            .metadata()
            .map_err(|e| ManagerError::ReadFailed {
                path: entry.path().to_path_buf(),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "metadata failed")),
            })?
            .len();
        let sha256 = calculate_file_checksum(entry.path())?;

        let file = FileEntry::new(relative_path, size, sha256);
        let blob = blob_filename(&file.relative_path)
            .split('/')
            .fold(version_dir.clone(), |path, segment| path.join(segment));

        if let Some(parent) = blob.parent() {
            create_dir(parent)?;
        }
        fs::copy(entry.path(), &blob).map_err(|e| ManagerError::WriteFailed {
            path: blob.clone(),
            source: e,
        })?;
        debug!(path = %file.relative_path, size, "packaged");

        manifest.files.push(file);
    }

    let json = serialize_manifest(&manifest).map_err(|e| ManagerError::WriteFailed {
        path: output.join(MANIFEST_FILENAME),
        source: io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
    })?;
    let manifest_path = output.join(MANIFEST_FILENAME);
    fs::write(&manifest_path, json).map_err(|e| ManagerError::WriteFailed {
        path: manifest_path.clone(),
        source: e,
    })?;

    info!(
        version = %manifest.version,
        files = manifest.files.len(),
        bytes = manifest.total_size(),
        output = %output.display(),
        "package created"
    );
    Ok(manifest)
}

/// Version tag derived from the current UTC time.
fn timestamp_version() -> String {
    let now = Utc::now();
    format!(
        "{}.{}.{}.{}",
        now.year(),
        now.month(),
        now.day(),
        now.hour() * 60 + now.minute()
    )
}

/// Forward-slash path of `path` relative to `root`.
fn relative_path(root: &Path, path: &Path) -> ManagerResult<String> {
    let stripped = path
        .strip_prefix(root)
        .map_err(|_| ManagerError::InvalidConfig(format!("{} is outside the source", path.display())))?;

    let segments: Vec<String> = stripped
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    Ok(segments.join("/"))
}

fn create_dir(path: &Path) -> ManagerResult<()> {
    fs::create_dir_all(path).map_err(|e| ManagerError::CreateDirFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
