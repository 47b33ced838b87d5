//! Package Manager for installing and removing manifest-described packages.
//!
//! This module provides the client-side package management functionality,
//! complementing [`create_package`] which handles package creation.
//!
//! # Overview
//!
//! The Manager handles:
//! - Fetching the package manifest from a mirror
//! - Comparing the local directory against the manifest (size, then SHA-256)
//! - Downloading missing or stale files and committing them atomically
//! - Optionally pruning files that do not belong to the package
//! - Removing exactly the files a package owns
//!
//! # Architecture
//!
//! The manager uses trait-based abstractions for testability:
//!
//! - [`PackageFetcher`] - Opens a byte stream for a URL
//! - [`BufferSizing`] - Chooses the download chunk size
//!
//! # Example
//!
//! ```ignore
//! use cloudpkg::manager::{ManagerConfig, PackageManager};
//!
//! let manager = PackageManager::http(ManagerConfig::default())?;
//! manager.install(
//!     "https://mirror.example.com/app/package.json",
//!     Path::new("/opt/app"),
//!     None,
//!     false,
//!     None,
//! )?;
//! ```

mod cancel;
mod config;
mod download;
mod error;
mod installer;
mod packager;
mod remote;
mod scanner;
mod traits;
mod uninstaller;

use std::path::Path;

use tokio_util::sync::CancellationToken;

pub use config::{default_config_path, ConfigError, ManagerConfig};
pub use download::{
    calculate_checksum, calculate_file_checksum, calculate_percent, fetch_and_commit,
    AnyFetcher, BufferSizing, CommitRequest, DownloadProgress, FileFetcher, FixedBufferSize,
    HttpFetcher, InstallProgress, InstallProgressCallback, MemoryFetcher, PercentTracker,
    COMPLETE_PERCENT, DEFAULT_BUFFER_SIZE, DEFAULT_TIMEOUT_SECS, MAX_PARTIAL_PERCENT,
    MIN_BUFFER_SIZE,
};
pub use error::{ManagerError, ManagerResult};
pub use installer::{InstallOptions, InstallResult, PackageInstaller};
pub use packager::create_package;
pub use remote::fetch_manifest;
pub use scanner::{find_extraneous, is_installed};
pub use traits::{FetchResponse, PackageFetcher};
pub use uninstaller::{PackageUninstaller, UninstallResult};

/// High-level entry point owning a transport and its settings.
///
/// Each call builds a short-lived installer or uninstaller borrowing the
/// fetcher, so one manager can serve any number of sequential operations.
pub struct PackageManager<F: PackageFetcher> {
    fetcher: F,
    config: ManagerConfig,
}

impl PackageManager<AnyFetcher> {
    /// Create a manager that fetches over HTTP(S) or from local paths.
    pub fn http(config: ManagerConfig) -> ManagerResult<Self> {
        let http = HttpFetcher::with_user_agent(config.timeout, &config.user_agent)?;
        Ok(Self::new(AnyFetcher::new(http), config))
    }
}

impl<F: PackageFetcher> PackageManager<F> {
    /// Create a manager with an injected transport.
    pub fn new(fetcher: F, config: ManagerConfig) -> Self {
        Self { fetcher, config }
    }

    /// Get the manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Get the underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Install or repair the package at `manifest_url` under `root`.
    ///
    /// See [`PackageInstaller::install`].
    pub fn install(
        &self,
        manifest_url: &str,
        root: &Path,
        on_progress: Option<&InstallProgressCallback>,
        prune_extraneous: bool,
        cancel: Option<&CancellationToken>,
    ) -> ManagerResult<InstallResult> {
        let installer = PackageInstaller::new(&self.fetcher)
            .with_buffer_sizing(FixedBufferSize::new(self.config.buffer_size));
        let options = InstallOptions::default().with_prune_extraneous(prune_extraneous);

        installer.install(manifest_url, root, options, on_progress, cancel)
    }

    /// Remove the package at `manifest_url` from `root`.
    ///
    /// See [`PackageUninstaller::uninstall`].
    pub fn uninstall(
        &self,
        manifest_url: &str,
        root: &Path,
        on_progress: Option<&InstallProgressCallback>,
        cancel: Option<&CancellationToken>,
    ) -> ManagerResult<UninstallResult> {
        PackageUninstaller::new(&self.fetcher).uninstall(manifest_url, root, on_progress, cancel)
    }
}
