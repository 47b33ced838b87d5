//! Configuration for the Package Manager.
//!
//! Settings come from code (builder methods) or from an INI file, by default
//! `~/.cloudpkg/config.ini`:
//!
//! ```ini
//! [download]
//! timeout_secs = 30
//! buffer_size = 65536
//! user_agent = cloudpkg/0.3.0
//!
//! [install]
//! prune_extraneous = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::download::{DEFAULT_BUFFER_SIZE, DEFAULT_TIMEOUT_SECS, MIN_BUFFER_SIZE};

const SECTION_DOWNLOAD: &str = "download";
const SECTION_INSTALL: &str = "install";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file.
    #[error("failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// A value could not be interpreted.
    #[error("invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Configuration for the Package Manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// HTTP connect timeout.
    pub timeout: Duration,

    /// Chunk size for streaming downloads.
    pub buffer_size: usize,

    /// Whether installs delete non-package files by default.
    pub prune_extraneous: bool,

    /// User agent sent with HTTP requests.
    pub user_agent: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            buffer_size: DEFAULT_BUFFER_SIZE,
            prune_extraneous: false,
            user_agent: format!("cloudpkg/{}", crate::VERSION),
        }
    }
}

impl ManagerConfig {
    /// Load configuration from the default path.
    ///
    /// Returns defaults when the file or the home directory does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        Self::from_ini(&ini)
    }

    /// Build configuration from parsed INI content.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some(SECTION_DOWNLOAD)) {
            if let Some(value) = section.get("timeout_secs") {
                let secs: u64 = parse_value(SECTION_DOWNLOAD, "timeout_secs", value)?;
                config.timeout = Duration::from_secs(secs);
            }
            if let Some(value) = section.get("buffer_size") {
                let size: usize = parse_value(SECTION_DOWNLOAD, "buffer_size", value)?;
                if size < MIN_BUFFER_SIZE {
                    return Err(ConfigError::InvalidValue {
                        section: SECTION_DOWNLOAD.to_string(),
                        key: "buffer_size".to_string(),
                        value: value.to_string(),
                        reason: format!("must be at least {}", MIN_BUFFER_SIZE),
                    });
                }
                config.buffer_size = size;
            }
            if let Some(value) = section.get("user_agent") {
                config.user_agent = value.trim().to_string();
            }
        }

        if let Some(section) = ini.section(Some(SECTION_INSTALL)) {
            if let Some(value) = section.get("prune_extraneous") {
                config.prune_extraneous = parse_bool(SECTION_INSTALL, "prune_extraneous", value)?;
            }
        }

        Ok(config)
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the download chunk size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(MIN_BUFFER_SIZE);
        self
    }

    /// Enable or disable pruning of non-package files.
    pub fn with_prune_extraneous(mut self, prune: bool) -> Self {
        self.prune_extraneous = prune;
        self
    }

    /// Set the HTTP user agent.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

/// Default config file location (`~/.cloudpkg/config.ini`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cloudpkg").join("config.ini"))
}

fn parse_value<T: std::str::FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
