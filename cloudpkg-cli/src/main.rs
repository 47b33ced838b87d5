//! cloudpkg CLI - Command-line interface
//!
//! This binary installs, removes and publishes packages using the cloudpkg
//! library.

mod commands;
mod error;
mod runner;
mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::install::InstallArgs;
use commands::pack::PackArgs;
use commands::uninstall::UninstallArgs;
use error::CliError;
use runner::{CliRunner, GlobalOptions};

#[derive(Parser)]
#[command(name = "cloudpkg")]
#[command(version, about = "Install versioned file packages from a mirror", long_about = None)]
struct Cli {
    /// Config file (default: ~/.cloudpkg/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// HTTP connect timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Download chunk size in bytes
    #[arg(long, global = true)]
    buffer_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install or repair a package
    Install(InstallArgs),

    /// Remove the files a package installed
    Uninstall(UninstallArgs),

    /// Build a package from a directory
    Pack(PackArgs),
}

impl Cli {
    fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            config: self.config.clone(),
            verbose: self.verbose,
            log_file: self.log_file.clone(),
            timeout: self.timeout,
            buffer_size: self.buffer_size,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runner = CliRunner::new(&cli.global_options())?;

    match cli.command {
        Commands::Install(args) => commands::install::run(args, &runner),
        Commands::Uninstall(args) => commands::uninstall::run(args, &runner),
        Commands::Pack(args) => commands::pack::run(args, &runner),
    }
}
