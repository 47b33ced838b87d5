//! Download machinery for package files.
//!
//! This module provides everything needed to move one file from a mirror to
//! its installed location:
//! - SHA-256 content hashing (`checksum`)
//! - Transports: HTTP (`http`), local mirrors (`file`), in-memory (`memory`)
//! - Staged, atomic fetch-and-commit of a single file (`commit`)
//! - Percentage math and progress events (`progress`)
//! - Chunk size strategy (`buffer`)
//!
//! # Architecture
//!
//! ```text
//! fetch_and_commit (commit)
//!         │
//!         ├── PackageFetcher (trait)
//!         │       ├── HttpFetcher
//!         │       ├── FileFetcher / AnyFetcher
//!         │       └── MemoryFetcher
//!         │
//!         ├── staging_path + rename (atomic commit)
//!         │
//!         └── DownloadProgress / PercentTracker (deduplicated reports)
//! ```

mod buffer;
mod checksum;
mod commit;
mod file;
mod http;
mod memory;
mod progress;

pub use buffer::{BufferSizing, FixedBufferSize, DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE};
pub use checksum::{calculate_checksum, calculate_file_checksum};
pub use commit::{fetch_and_commit, CommitRequest};
pub use file::{AnyFetcher, FileFetcher};
pub use http::{HttpFetcher, DEFAULT_TIMEOUT_SECS};
pub use memory::MemoryFetcher;
pub use progress::{
    calculate_percent, DownloadProgress, InstallProgress, InstallProgressCallback,
    PercentTracker, ProgressReporter, COMPLETE_PERCENT, MAX_PARTIAL_PERCENT,
};
