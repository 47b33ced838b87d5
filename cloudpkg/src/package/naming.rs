//! Centralized package naming conventions.
//!
//! This module is the single source of truth for how a package is laid out
//! on a mirror and on disk:
//! - Manifest filename (`package.json`)
//! - Per-version blob directory (e.g., `v1.2/`)
//! - Blob filenames (installed filename plus `.dpcp`)
//! - Staging filenames used while a download is in flight
//!
//! All other modules should use these functions rather than constructing names directly.
//! This keeps the packager and the installer in agreement.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Extension appended to every file blob published on a mirror.
///
/// The installed file never carries this suffix.
pub const PACKAGE_FILE_EXT: &str = ".dpcp";

/// Filename of the manifest at the root of a published package.
pub const MANIFEST_FILENAME: &str = "package.json";

/// Name of the mirror directory holding the blobs for one version.
///
/// # Examples
///
/// ```
/// use cloudpkg::package::version_dir_name;
///
/// assert_eq!(version_dir_name("1.0"), "v1.0");
/// ```
pub fn version_dir_name(version: &str) -> String {
    format!("v{}", version)
}

/// Remote location of one file blob.
///
/// Truncates `manifest_url` after its last `/`, then appends the version
/// directory, the file's relative path and the blob extension.
///
/// # Examples
///
/// ```
/// use cloudpkg::package::file_url;
///
/// assert_eq!(
///     file_url("https://cdn.example.com/app/package.json", "1", "a/b.txt"),
///     "https://cdn.example.com/app/v1/a/b.txt.dpcp"
/// );
/// ```
pub fn file_url(manifest_url: &str, version: &str, relative_path: &str) -> String {
    let base = match manifest_url.rfind('/') {
        Some(idx) => &manifest_url[..=idx],
        None => "",
    };
    format!(
        "{}{}/{}{}",
        base,
        version_dir_name(version),
        relative_path,
        PACKAGE_FILE_EXT
    )
}

/// Path a download is written to before it is renamed into place.
///
/// The staging file sits next to its destination so the final rename never
/// crosses a filesystem boundary.
pub fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(PACKAGE_FILE_EXT);
    PathBuf::from(name)
}

/// Staging path for `dest` that is none of the `reserved` paths.
///
/// Starts from [`staging_path`] and appends the extension again while the
/// candidate is reserved, so a package listing both `x` and `x.dpcp` stages
/// `x` as `x.dpcp.dpcp`.
pub fn staging_path_excluding(dest: &Path, reserved: &HashSet<PathBuf>) -> PathBuf {
    let mut candidate = staging_path(dest);
    while reserved.contains(&candidate) {
        candidate = staging_path(&candidate);
    }
    candidate
}

/// Blob filename for an installed filename.
pub fn blob_filename(file_name: &str) -> String {
    format!("{}{}", file_name, PACKAGE_FILE_EXT)
}
