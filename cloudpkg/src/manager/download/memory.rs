//! In-memory transport.
//!
//! Serves registered byte buffers by URL and records every request, which lets
//! tests assert exactly which files an operation fetched.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::traits::{FetchResponse, PackageFetcher};

/// Fetcher backed by a URL to bytes map.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    resources: Arc<Mutex<HashMap<String, Arc<Vec<u8>>>>>,
    requests: Arc<Mutex<Vec<String>>>,
    declare_length: bool,
}

impl MemoryFetcher {
    /// Create an empty fetcher that declares content lengths.
    pub fn new() -> Self {
        Self {
            declare_length: true,
            ..Default::default()
        }
    }

    /// Stop declaring content lengths, like a chunked HTTP response.
    pub fn without_content_length(mut self) -> Self {
        self.declare_length = false;
        self
    }

    /// Register `bytes` under `url`, replacing any previous content.
    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.resources
            .lock()
            .insert(url.into(), Arc::new(bytes.into()));
    }

    /// Remove the resource at `url`.
    pub fn remove(&self, url: &str) {
        self.resources.lock().remove(url);
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }
}

impl PackageFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> ManagerResult<FetchResponse> {
        self.requests.lock().push(url.to_string());

        let bytes = self
            .resources
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: "GET request failed with status 404 Not Found".to_string(),
            })?;

        let length = self.declare_length.then_some(bytes.len() as u64);
        let body = Cursor::new(bytes.as_ref().clone());
        Ok(FetchResponse::new(length, body))
    }
}
