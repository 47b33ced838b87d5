//! Package description types and naming rules.
//!
//! This module provides the data structures shared by the packager and the
//! installer.
//!
//! # Overview
//!
//! A published package consists of:
//!
//! - **Manifest** (`package.json`): name, version and the ordered list of
//!   files with their sizes and SHA-256 digests
//! - **Blobs** (`v{version}/<relative path>.dpcp`): the raw bytes of every
//!   file, one blob per manifest entry
//!
//! ```text
//! https://mirror/app/
//! ├── package.json
//! └── v1.4/
//!     ├── bin/app.dpcp
//!     └── data/readme.txt.dpcp
//! ```

mod manifest;
mod naming;

pub use manifest::{parse_manifest, serialize_manifest, FileEntry, ManifestError, PackageManifest};

pub use naming::{
    blob_filename, file_url, staging_path, staging_path_excluding, version_dir_name, MANIFEST_FILENAME, PACKAGE_FILE_EXT,
};
