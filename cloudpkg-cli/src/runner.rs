//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, configuration loading and the Ctrl-C
//! handler to reduce duplication across command handlers.

use std::path::PathBuf;
use std::time::Duration;

use cloudpkg::logging::{init_logging, LoggingGuard, LoggingOptions};
use cloudpkg::manager::ManagerConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::CliError;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub buffer_size: Option<usize>,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Configuration after command-line overrides
    config: ManagerConfig,
}

impl CliRunner {
    /// Initialize logging and load configuration.
    pub fn new(options: &GlobalOptions) -> Result<Self, CliError> {
        let logging_guard = init_logging(&LoggingOptions {
            verbose: options.verbose,
            log_file: options.log_file.clone(),
        })
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let config = load_config(options)?;
        debug!(?config, "configuration loaded");

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the effective configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("cloudpkg v{}", cloudpkg::VERSION);
        debug!("cloudpkg CLI: {} command", command);
    }

    /// Create a token that Ctrl-C cancels.
    pub fn cancellation_token(&self) -> Result<CancellationToken, CliError> {
        let token = CancellationToken::new();
        let handle = token.clone();

        ctrlc::set_handler(move || {
            eprintln!();
            eprintln!("Received interrupt, stopping after the current chunk...");
            handle.cancel();
        })
        .map_err(|e| CliError::SignalHandler(e.to_string()))?;

        Ok(token)
    }
}

/// Load the config file and apply command-line overrides.
pub fn load_config(options: &GlobalOptions) -> Result<ManagerConfig, CliError> {
    let mut config = match &options.config {
        Some(path) if !path.exists() => {
            return Err(CliError::Config(format!(
                "config file not found: {}",
                path.display()
            )))
        }
        Some(path) => ManagerConfig::load_from(path)?,
        None => ManagerConfig::load()?,
    };

    if let Some(secs) = options.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(size) = options.buffer_size {
        config = config.with_buffer_size(size);
    }

    Ok(config)
}
