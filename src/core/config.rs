//! # Configuration
//!
//! A small sparse TOML file with a two-step override hierarchy:
//! defaults → config file.
//!
//! Config lives at `~/.seterm/config.toml`. The file is optional and is never
//! created by the application; a missing file simply means defaults.
//! Colors, font and the shell program are fixed and have no settings here.

use log::LevelFilter;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SetermConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneralConfig {
    /// First transcript line shown at startup
    pub banner: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecutorConfig {
    /// Kill commands that run longer than this. Absent or 0 = no limit.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// One of off, error, warn, info, debug, trace
    pub level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const APP_TITLE: &str = "SE Terminal";
pub const DEFAULT_BANNER: &str = "SE Terminal NLP-Ready";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub banner: String,
    pub command_timeout: Option<Duration>,
    pub log_level: LevelFilter,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve(&SetermConfig::default())
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.seterm`, the home of the config file and the log.
pub fn app_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".seterm"))
}

/// Returns the path to `~/.seterm/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    app_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.seterm/config.toml`.
///
/// A missing file (or missing home directory) yields `SetermConfig::default()`.
/// A file that exists but is malformed yields `ConfigError::Parse`.
pub fn load_config() -> Result<SetermConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(SetermConfig::default()),
    }
}

/// Load config from an explicit path, with the same missing-file rule as `load_config`.
pub fn load_config_from(path: &Path) -> Result<SetermConfig, ConfigError> {
    if !path.exists() {
        return Ok(SetermConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&contents).map_err(ConfigError::Parse)
}

// ============================================================================
// Resolution
// ============================================================================

/// Collapse the sparse file config into concrete values.
pub fn resolve(config: &SetermConfig) -> ResolvedConfig {
    let banner = config
        .general
        .banner
        .clone()
        .unwrap_or_else(|| DEFAULT_BANNER.to_string());

    let command_timeout = config
        .executor
        .timeout_secs
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs);

    // Unknown level names fall back to the default rather than failing startup
    let log_level = config
        .logging
        .level
        .as_deref()
        .and_then(|level| LevelFilter::from_str(level.trim()).ok())
        .unwrap_or(DEFAULT_LOG_LEVEL);

    ResolvedConfig {
        banner,
        command_timeout,
        log_level,
    }
}
