//! Fetch-and-commit pipeline for a single file.
//!
//! A file is streamed into a staging path next to its destination and only
//! renamed over the destination once the whole body has arrived. Whatever
//! happens before the rename (errors, cancellation, a crash) leaves the
//! destination with its previous content, or absent if it never existed.
//!
//! ```text
//! fetch(url) ──► staging (<dest>.dpcp) ──rename──► dest
//!                  ▲ stale copy deleted first
//! ```

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::progress::{DownloadProgress, PercentTracker};
use crate::manager::cancel::check_cancelled;
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::traits::PackageFetcher;
use crate::package::staging_path;

/// One file to fetch and commit.
#[derive(Debug, Clone, Copy)]
pub struct CommitRequest<'a> {
    /// Remote location of the blob.
    pub url: &'a str,
    /// Final installed path.
    pub dest: &'a Path,
    /// Optional cancellation, checked between chunks.
    pub cancel: Option<&'a CancellationToken>,
    /// Staging file. Defaults to [`staging_path`] of `dest`; callers that
    /// install several files pass one that collides with none of them.
    pub staging: Option<&'a Path>,
}

/// Download `request.url` and atomically place it at `request.dest`.
///
/// `buffer` is the caller's reusable chunk buffer; its length is the chunk
/// size. `on_progress` is invoked at most once per chunk, and only when the
/// rounded percentage rises (every chunk while the length is unknown).
///
/// Returns the number of bytes committed.
pub fn fetch_and_commit<F: PackageFetcher + ?Sized>(
    fetcher: &F,
    request: CommitRequest<'_>,
    buffer: &mut [u8],
    mut on_progress: Option<&mut dyn FnMut(DownloadProgress)>,
) -> ManagerResult<u64> {
    let CommitRequest {
        url,
        dest,
        cancel,
        staging,
    } = request;

    check_cancelled(cancel)?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let staging = staging
        .map(Path::to_path_buf)
        .unwrap_or_else(|| staging_path(dest));
    remove_stale(&staging)?;

    let mut response = fetcher.fetch(url)?;
    let total = response.content_length;

    let mut file = File::create(&staging).map_err(|e| ManagerError::WriteFailed {
        path: staging.clone(),
        source: e,
    })?;

    let mut tracker = PercentTracker::new();
    let mut downloaded: u64 = 0;

    loop {
        check_cancelled(cancel)?;

        let bytes_read = match response.body.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ManagerError::DownloadFailed {
                    url: url.to_string(),
                    reason: format!("read error: {}", e),
                })
            }
        };

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| ManagerError::WriteFailed {
                path: staging.clone(),
                source: e,
            })?;

        downloaded += bytes_read as u64;

        if let Some(cb) = on_progress.as_mut() {
            let progress = DownloadProgress { downloaded, total };
            let changed = match progress.percent() {
                Some(percent) => tracker.advance(Some(percent)),
                None => true,
            };
            if changed {
                cb(progress);
            }
        }
    }

    if let Some(expected) = total {
        if downloaded != expected {
            return Err(ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: format!("expected {} bytes, received {}", expected, downloaded),
            });
        }
    }

    file.sync_all().map_err(|e| ManagerError::WriteFailed {
        path: staging.clone(),
        source: e,
    })?;
    drop(file);

    check_cancelled(cancel)?;

    fs::rename(&staging, dest).map_err(|e| ManagerError::RenameFailed {
        from: staging.clone(),
        to: dest.to_path_buf(),
        source: e,
    })?;

    debug!(url, dest = %dest.display(), bytes = downloaded, "committed");
    Ok(downloaded)
}

/// Delete a staging file left behind by an interrupted run.
fn remove_stale(staging: &Path) -> ManagerResult<()> {
    match fs::remove_file(staging) {
        Ok(()) => {
            trace!(path = %staging.display(), "removed stale staging file");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ManagerError::RemoveFailed {
            path: staging.to_path_buf(),
            source: e,
        }),
    }
}
