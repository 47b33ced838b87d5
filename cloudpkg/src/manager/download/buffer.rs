//! Download buffer sizing.
//!
//! The chunk size only affects throughput, never correctness, so it is chosen
//! through a small strategy trait that callers may replace.

/// Default chunk size for streaming downloads (64KB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Smallest chunk size accepted by the pipeline.
pub const MIN_BUFFER_SIZE: usize = 4 * 1024;

/// Strategy for choosing the chunk size of one operation.
pub trait BufferSizing: Send + Sync {
    /// Number of bytes to read per chunk.
    fn buffer_size(&self) -> usize;
}

/// Always use the same chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBufferSize(usize);

impl FixedBufferSize {
    /// Create a fixed size strategy, raised to [`MIN_BUFFER_SIZE`] if smaller.
    pub fn new(size: usize) -> Self {
        Self(size.max(MIN_BUFFER_SIZE))
    }
}

impl Default for FixedBufferSize {
    fn default() -> Self {
        Self(DEFAULT_BUFFER_SIZE)
    }
}

impl BufferSizing for FixedBufferSize {
    fn buffer_size(&self) -> usize {
        self.0
    }
}
