//! Package removal.
//!
//! Deletes exactly the files a manifest lists and then any parent directory
//! that became empty as a result, the install root included. Files the
//! package does not own, and the directories holding them, are left alone.

use std::fs;
use std::io;
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::cancel::check_cancelled;
use super::download::{calculate_percent, InstallProgressCallback, PercentTracker, ProgressReporter};
use super::error::{ManagerError, ManagerResult};
use super::remote::fetch_manifest;
use super::traits::PackageFetcher;

/// Result of a package removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallResult {
    /// Version named by the manifest.
    pub version: String,
    /// Package files that existed and were deleted.
    pub files_removed: usize,
    /// Parent directories deleted because they became empty.
    pub directories_removed: usize,
}

/// Package uninstaller.
pub struct PackageUninstaller<F: PackageFetcher> {
    fetcher: F,
}

impl<F: PackageFetcher> PackageUninstaller<F> {
    /// Create a new uninstaller.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Remove the package described at `manifest_url` from `root`.
    ///
    /// Progress is the file index over the file count; deletion cost does not
    /// scale with file size. Failing to delete a directory that is not empty
    /// is expected and ignored; every other failure is returned.
    pub fn uninstall(
        &self,
        manifest_url: &str,
        root: &Path,
        on_progress: Option<&InstallProgressCallback>,
        cancel: Option<&CancellationToken>,
    ) -> ManagerResult<UninstallResult> {
        let reporter = ProgressReporter::new(on_progress);

        check_cancelled(cancel)?;
        reporter.emit(|| "Loading package manifest".to_string(), Some(0), Some(0));
        let manifest = fetch_manifest(&self.fetcher, manifest_url)?;

        let mut result = UninstallResult {
            version: manifest.version.clone(),
            ..Default::default()
        };

        let count = manifest.files.len() as f64;
        let mut tracker = PercentTracker::new();

        for (index, entry) in manifest.files.iter().enumerate() {
            check_cancelled(cancel)?;

            let percent = calculate_percent(index as f64, count);
            if tracker.advance(percent) {
                reporter.emit(
                    || format!("Deleting: {}", entry.relative_path),
                    percent,
                    percent,
                );
            }

            let path = entry.local_path(root);
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "deleted");
                    result.files_removed += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ManagerError::RemoveFailed { path, source: e });
                }
            }

            if let Some(parent) = path.parent() {
                if remove_dir_if_empty(parent) {
                    result.directories_removed += 1;
                }
            }
        }

        reporter.done();

        info!(
            version = %result.version,
            files = result.files_removed,
            directories = result.directories_removed,
            "uninstall complete"
        );
        Ok(result)
    }
}

/// Try to delete `dir`, returning whether it was removed.
///
/// Fails harmlessly when the directory still has entries or is already gone.
fn remove_dir_if_empty(dir: &Path) -> bool {
    match fs::remove_dir(dir) {
        Ok(()) => {
            debug!(path = %dir.display(), "removed empty directory");
            true
        }
        Err(e) => {
            trace!(path = %dir.display(), error = %e, "directory kept");
            false
        }
    }
}
