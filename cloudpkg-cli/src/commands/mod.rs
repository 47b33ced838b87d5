//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`install`] - Install or repair a package
//! - [`uninstall`] - Remove the files a package owns
//! - [`pack`] - Publish a directory as a package

pub mod install;
pub mod pack;
pub mod uninstall;
