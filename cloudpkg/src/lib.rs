//! cloudpkg - Manifest-driven package distribution
//!
//! This library installs a versioned tree of files from a mirror into a local
//! directory and later removes exactly the files it installed.
//!
//! # High-Level API
//!
//! For most use cases, [`manager::PackageManager`] provides a simplified facade:
//!
//! ```ignore
//! use cloudpkg::manager::{ManagerConfig, PackageManager};
//!
//! let manager = PackageManager::http(ManagerConfig::load()?)?;
//! let result = manager.install(url, root, None, false, None)?;
//! println!("fetched {} files", result.files_fetched);
//! ```

pub mod logging;
pub mod manager;
pub mod package;

/// Version of the cloudpkg library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
