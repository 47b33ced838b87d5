//! `cloudpkg install` - install or repair a package.

use std::path::PathBuf;

use clap::Args;
use cloudpkg::manager::PackageManager;
use indicatif::HumanBytes;

use crate::error::CliError;
use crate::runner::CliRunner;
use crate::ui::ProgressDisplay;

/// Arguments for the install command.
#[derive(Debug, Args)]
pub struct InstallArgs {
    /// URL of the package manifest (package.json)
    pub manifest_url: String,

    /// Directory to install into
    pub root: PathBuf,

    /// Delete files under ROOT that are not part of the package
    #[arg(long)]
    pub prune: bool,
}

/// Run the install command.
pub fn run(args: InstallArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("install");

    let config = runner.config().clone();
    let prune = args.prune || config.prune_extraneous;
    let manager = PackageManager::http(config)?;
    let cancel = runner.cancellation_token()?;

    let display = ProgressDisplay::new(true);
    let callback = display.callback();
    let result = manager.install(
        &args.manifest_url,
        &args.root,
        Some(&callback),
        prune,
        Some(&cancel),
    );
    display.finish();
    let result = result?;

    println!(
        "Installed version {} into {}",
        result.version,
        args.root.display()
    );
    println!(
        "  {} files: {} downloaded ({}), {} up to date",
        result.files_total,
        result.files_fetched,
        HumanBytes(result.bytes_downloaded),
        result.files_skipped
    );
    if result.files_pruned > 0 {
        println!("  {} non-package files removed", result.files_pruned);
    }

    Ok(())
}
