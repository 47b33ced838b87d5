//! Local mirror transport and scheme dispatch.
//!
//! [`FileFetcher`] reads blobs from a package published to a local or mounted
//! directory, addressed either as `file://` URLs or plain paths.
//! [`AnyFetcher`] picks HTTP or file access from the URL scheme.

use std::fs::File;
use std::path::PathBuf;

use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::traits::{FetchResponse, PackageFetcher};

use super::http::HttpFetcher;

const FILE_SCHEME: &str = "file://";

/// Fetcher that reads from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    /// Create a new file fetcher.
    pub fn new() -> Self {
        Self
    }

    /// Map a `file://` URL or plain path to a filesystem path.
    pub fn url_to_path(url: &str) -> PathBuf {
        PathBuf::from(url.strip_prefix(FILE_SCHEME).unwrap_or(url))
    }
}

impl PackageFetcher for FileFetcher {
    fn fetch(&self, url: &str) -> ManagerResult<FetchResponse> {
        let path = Self::url_to_path(url);
        let file = File::open(&path).map_err(|e| ManagerError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let len = file
            .metadata()
            .map_err(|e| ManagerError::ReadFailed {
                path: path.clone(),
                source: e,
            })?
            .len();

        Ok(FetchResponse::new(Some(len), file))
    }
}

/// Fetcher that dispatches on the URL scheme.
///
/// `http://` and `https://` go to the wrapped [`HttpFetcher`]; anything else
/// is treated as a local path.
#[derive(Debug, Clone)]
pub struct AnyFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl AnyFetcher {
    /// Create a dispatching fetcher around an HTTP fetcher.
    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            file: FileFetcher::new(),
        }
    }

    fn is_http(url: &str) -> bool {
        let lower = url.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }
}

impl PackageFetcher for AnyFetcher {
    fn fetch(&self, url: &str) -> ManagerResult<FetchResponse> {
        if Self::is_http(url) {
            self.http.fetch(url)
        } else {
            self.file.fetch(url)
        }
    }
}
