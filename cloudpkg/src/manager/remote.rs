//! Manifest retrieval.

use std::io::Read;

use tracing::{debug, info};

use super::error::{ManagerError, ManagerResult};
use super::traits::PackageFetcher;
use crate::package::{parse_manifest, PackageManifest};

/// Fetch and parse the manifest at `url`.
///
/// Any transport failure becomes [`ManagerError::ManifestFetchFailed`] and any
/// payload problem [`ManagerError::ManifestParseFailed`].
pub fn fetch_manifest<F: PackageFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
) -> ManagerResult<PackageManifest> {
    let fetch_failed = |reason: String| ManagerError::ManifestFetchFailed {
        url: url.to_string(),
        reason,
    };

    let mut response = fetcher.fetch(url).map_err(|e| fetch_failed(e.to_string()))?;

    let mut bytes = Vec::with_capacity(response.content_length.unwrap_or(0).min(1 << 20) as usize);
    response
        .body
        .read_to_end(&mut bytes)
        .map_err(|e| fetch_failed(format!("read error: {}", e)))?;
    debug!(url, bytes = bytes.len(), "manifest downloaded");

    let manifest = parse_manifest(&bytes).map_err(|e| ManagerError::ManifestParseFailed {
        url: url.to_string(),
        source: e,
    })?;

    info!(
        url,
        name = manifest.name.as_deref().unwrap_or("-"),
        version = %manifest.version,
        files = manifest.files.len(),
        "loaded package manifest"
    );
    Ok(manifest)
}
