//! `cloudpkg uninstall` - remove the files a package owns.

use std::path::PathBuf;

use clap::Args;
use cloudpkg::manager::PackageManager;

use crate::error::CliError;
use crate::runner::CliRunner;
use crate::ui::ProgressDisplay;

/// Arguments for the uninstall command.
#[derive(Debug, Args)]
pub struct UninstallArgs {
    /// URL of the package manifest (package.json)
    pub manifest_url: String,

    /// Directory the package was installed into
    pub root: PathBuf,
}

/// Run the uninstall command.
pub fn run(args: UninstallArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("uninstall");

    let manager = PackageManager::http(runner.config().clone())?;
    let cancel = runner.cancellation_token()?;

    let display = ProgressDisplay::new(false);
    let callback = display.callback();
    let result = manager.uninstall(&args.manifest_url, &args.root, Some(&callback), Some(&cancel));
    display.finish();
    let result = result?;

    println!(
        "Removed version {} from {}: {} files, {} directories",
        result.version,
        args.root.display(),
        result.files_removed,
        result.directories_removed
    );

    Ok(())
}
