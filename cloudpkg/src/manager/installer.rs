//! Package installer for synchronizing a directory with a manifest.
//!
//! This module orchestrates the full installation workflow:
//! 1. Fetch the package manifest
//! 2. Optionally delete files that are not part of the package
//! 3. For every file, in manifest order: skip it when size and digest
//!    already match, otherwise fetch it and commit it atomically
//! 4. Report `Done` at 100%
//!
//! Re-running an install is the repair mechanism: files committed by an
//! earlier, interrupted run are recognized by their digest and skipped.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::cancel::check_cancelled;
use super::download::{
    calculate_percent, fetch_and_commit, BufferSizing, CommitRequest, DownloadProgress,
    FixedBufferSize, InstallProgressCallback, PercentTracker, ProgressReporter, COMPLETE_PERCENT,
    MIN_BUFFER_SIZE,
};
use super::error::{ManagerError, ManagerResult};
use super::remote::fetch_manifest;
use super::scanner::{find_extraneous, is_installed};
use super::traits::PackageFetcher;
use crate::package::{file_url, staging_path_excluding, FileEntry, PackageManifest};

/// Options for one install run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Delete every file under the root that the manifest does not list.
    pub prune_extraneous: bool,
}

impl InstallOptions {
    /// Enable or disable pruning of non-package files.
    pub fn with_prune_extraneous(mut self, prune: bool) -> Self {
        self.prune_extraneous = prune;
        self
    }
}

/// Result of a package installation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallResult {
    /// Version of the installed package.
    pub version: String,
    /// Number of files listed in the manifest.
    pub files_total: usize,
    /// Files that were downloaded and committed.
    pub files_fetched: usize,
    /// Files that were already in sync.
    pub files_skipped: usize,
    /// Non-package files deleted before fetching.
    pub files_pruned: usize,
    /// Total bytes downloaded.
    pub bytes_downloaded: u64,
}

/// Package installer.
///
/// Holds the transport and the buffer sizing strategy. Each call to
/// [`install`](Self::install) allocates its own chunk buffer and reuses it for
/// every file of that call.
pub struct PackageInstaller<F: PackageFetcher> {
    /// Transport for the manifest and file blobs.
    fetcher: F,
    /// Chunk size strategy.
    sizing: Box<dyn BufferSizing>,
}

impl<F: PackageFetcher> PackageInstaller<F> {
    /// Create a new package installer with the default chunk size.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            sizing: Box::new(FixedBufferSize::default()),
        }
    }

    /// Set the chunk size strategy.
    pub fn with_buffer_sizing(mut self, sizing: impl BufferSizing + 'static) -> Self {
        self.sizing = Box::new(sizing);
        self
    }

    /// Get the underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Install the package described at `manifest_url` into `root`.
    ///
    /// # Arguments
    ///
    /// * `manifest_url` - Location of `package.json`
    /// * `root` - Install root directory
    /// * `options` - Install options
    /// * `on_progress` - Optional progress callback
    /// * `cancel` - Optional cancellation token
    ///
    /// # Errors
    ///
    /// Manifest, transport and filesystem failures abort the install.
    /// Cancellation returns [`ManagerError::Cancelled`]. Files committed
    /// before the failure stay in place.
    pub fn install(
        &self,
        manifest_url: &str,
        root: &Path,
        options: InstallOptions,
        on_progress: Option<&InstallProgressCallback>,
        cancel: Option<&CancellationToken>,
    ) -> ManagerResult<InstallResult> {
        let reporter = ProgressReporter::new(on_progress);

        check_cancelled(cancel)?;
        reporter.emit(|| "Loading package manifest".to_string(), Some(0), Some(0));
        let manifest = fetch_manifest(&self.fetcher, manifest_url)?;
        check_cancelled(cancel)?;

        let mut result = InstallResult {
            version: manifest.version.clone(),
            files_total: manifest.files.len(),
            ..Default::default()
        };

        if options.prune_extraneous {
            result.files_pruned = prune_extraneous(&manifest, root, cancel)?;
        }

        // staging names must never land on another file of this package
        let package_paths: HashSet<PathBuf> =
            manifest.files.iter().map(|f| f.local_path(root)).collect();

        let total_size = manifest.total_size() as f64;
        let mut completed: u64 = 0;
        let mut buffer = vec![0u8; self.sizing.buffer_size().max(MIN_BUFFER_SIZE)];

        for entry in &manifest.files {
            check_cancelled(cancel)?;

            let total_percent = calculate_percent(completed as f64, total_size);
            reporter.emit(
                || format!("Scanning: {}", entry.relative_path),
                Some(0),
                total_percent,
            );

            if is_installed(entry, root)? {
                debug!(path = %entry.relative_path, "already installed");
                result.files_skipped += 1;
                completed += entry.size;
                continue;
            }

            let bytes = self.fetch_entry(
                &manifest,
                manifest_url,
                entry,
                root,
                &package_paths,
                FileProgress {
                    reporter,
                    completed,
                    total_size,
                    total_percent,
                },
                &mut buffer,
                cancel,
            )?;

            completed += entry.size;
            result.files_fetched += 1;
            result.bytes_downloaded += bytes;

            reporter.emit(
                || format!("Downloading: {}", entry.relative_path),
                Some(COMPLETE_PERCENT),
                calculate_percent(completed as f64, total_size),
            );
        }

        reporter.done();

        info!(
            version = %result.version,
            fetched = result.files_fetched,
            skipped = result.files_skipped,
            pruned = result.files_pruned,
            bytes = result.bytes_downloaded,
            "install complete"
        );
        Ok(result)
    }

    /// Download one entry and commit it, folding its progress into the total.
    #[allow(clippy::too_many_arguments)]
    fn fetch_entry(
        &self,
        manifest: &PackageManifest,
        manifest_url: &str,
        entry: &FileEntry,
        root: &Path,
        package_paths: &HashSet<PathBuf>,
        progress: FileProgress<'_>,
        buffer: &mut [u8],
        cancel: Option<&CancellationToken>,
    ) -> ManagerResult<u64> {
        let url = file_url(manifest_url, &manifest.version, &entry.relative_path);
        let dest = entry.local_path(root);
        let staging = staging_path_excluding(&dest, package_paths);
        debug!(url = %url, dest = %dest.display(), "fetching");

        let request = CommitRequest {
            url: &url,
            dest: &dest,
            cancel,
            staging: Some(&staging),
        };

        if !progress.reporter.is_active() {
            return fetch_and_commit(&self.fetcher, request, buffer, None);
        }

        let mut file_tracker = PercentTracker::starting_at(Some(0));
        let mut total_tracker = PercentTracker::starting_at(progress.total_percent);
        let mut on_chunk = |p: DownloadProgress| {
            let file_size = p.total.unwrap_or(entry.size);
            let file_changed =
                file_tracker.advance(calculate_percent(p.downloaded as f64, file_size as f64));

            let in_flight = p.downloaded.min(entry.size);
            let total_changed = total_tracker.advance(calculate_percent(
                (progress.completed + in_flight) as f64,
                progress.total_size,
            ));

            if file_changed || total_changed {
                progress.reporter.emit(
                    || format!("Downloading: {}", entry.relative_path),
                    file_tracker.last(),
                    total_tracker.last(),
                );
            }
        };

        fetch_and_commit(&self.fetcher, request, buffer, Some(&mut on_chunk))
    }
}

/// Aggregate progress context for the file being fetched.
#[derive(Clone, Copy)]
struct FileProgress<'a> {
    reporter: ProgressReporter<'a>,
    /// Bytes of all files processed before this one.
    completed: u64,
    total_size: f64,
    /// Aggregate percent already reported for this file's scan.
    total_percent: Option<u8>,
}

/// Delete every non-package file under `root`.
///
/// Runs once before any fetch, so files committed during this install are
/// never candidates.
fn prune_extraneous(
    manifest: &PackageManifest,
    root: &Path,
    cancel: Option<&CancellationToken>,
) -> ManagerResult<usize> {
    let extraneous = find_extraneous(manifest, root)?;

    for path in &extraneous {
        check_cancelled(cancel)?;
        fs::remove_file(path).map_err(|e| ManagerError::RemoveFailed {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "pruned non-package file");
    }

    if !extraneous.is_empty() {
        info!(count = extraneous.len(), "pruned non-package files");
    }
    Ok(extraneous.len())
}
