//! Trait seams for the Package Manager.
//!
//! The installer never owns transport state. It receives a [`PackageFetcher`]
//! so that production code can use HTTP while tests substitute an in-memory
//! implementation.

use std::fmt;
use std::io::Read;

use super::error::ManagerResult;

/// An open byte stream for one remote resource.
pub struct FetchResponse {
    /// Length declared by the transport, if any.
    pub content_length: Option<u64>,
    /// Body reader. Reaching end-of-stream means the transfer completed.
    pub body: Box<dyn Read + Send>,
}

impl FetchResponse {
    /// Wrap a reader as a response.
    pub fn new(content_length: Option<u64>, body: impl Read + Send + 'static) -> Self {
        Self {
            content_length,
            body: Box::new(body),
        }
    }
}

impl fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResponse")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Capability to open a byte stream for a URL.
///
/// Implementations must return an error for non-success responses rather than
/// an error page body.
pub trait PackageFetcher: Send + Sync {
    /// Open a streaming read of `url`.
    fn fetch(&self, url: &str) -> ManagerResult<FetchResponse>;
}

impl<T: PackageFetcher + ?Sized> PackageFetcher for &T {
    fn fetch(&self, url: &str) -> ManagerResult<FetchResponse> {
        (**self).fetch(url)
    }
}

impl<T: PackageFetcher + ?Sized> PackageFetcher for Box<T> {
    fn fetch(&self, url: &str) -> ManagerResult<FetchResponse> {
        (**self).fetch(url)
    }
}
