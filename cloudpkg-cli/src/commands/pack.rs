//! `cloudpkg pack` - publish a directory as a package.

use std::path::PathBuf;

use clap::Args;
use cloudpkg::manager::create_package;
use cloudpkg::package::MANIFEST_FILENAME;
use indicatif::HumanBytes;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the pack command.
#[derive(Debug, Args)]
pub struct PackArgs {
    /// Directory whose files make up the package
    pub source: PathBuf,

    /// Directory to write the manifest and blobs to (replaced if it exists)
    pub output: PathBuf,

    /// Package name recorded in the manifest
    #[arg(long)]
    pub name: Option<String>,

    /// Package version (default: UTC timestamp)
    #[arg(long = "version")]
    pub package_version: Option<String>,
}

/// Run the pack command.
pub fn run(args: PackArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("pack");

    let manifest = create_package(
        &args.source,
        &args.output,
        args.name.as_deref(),
        args.package_version.as_deref(),
    )?;

    println!(
        "Packed {} files ({}) as version {}",
        manifest.file_count(),
        HumanBytes(manifest.total_size()),
        manifest.version
    );
    println!(
        "  Upload {} and the v{} directory to your mirror",
        args.output.join(MANIFEST_FILENAME).display(),
        manifest.version
    );

    Ok(())
}
