//! Configuration loading.
//!
//! `~/.tripvoice/config.toml` (or `--config <PATH>`) holds the settings;
//! every section is optional. Environment variables override file values and
//! file values override defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Utterance parser settings.
    pub parser: ParserConfig,

    /// HTTP service settings.
    pub server: ServerConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Utterance parser settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Trip length assumed when a start date is named without a duration.
    #[serde(default = "default_duration_days")]
    pub default_duration_days: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_duration_days: default_duration_days(),
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Origins allowed by CORS; empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rotated JSON logs written by `serve`.
    /// Defaults to `~/.tripvoice/logs`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

// Default value functions for serde

fn default_duration_days() -> u32 {
    3
}
fn default_addr() -> String {
    "127.0.0.1:3000".to_owned()
}
fn default_log_level() -> String {
    "info".to_owned()
}

impl Config {
    /// Load from `path`, or from the default location when `None`, then
    /// apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or any file cannot be
    /// read or parsed.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => load_config(path)?,
            None => load_default_config()?,
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function so tests need not touch the process env.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("TRIPVOICE_DEFAULT_DURATION_DAYS") {
            match v.parse() {
                Ok(n) => self.parser.default_duration_days = n,
                Err(_) => tracing::warn!(
                    var = "TRIPVOICE_DEFAULT_DURATION_DAYS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("TRIPVOICE_SERVER_ADDR") {
            self.server.addr = v;
        }
        if let Some(v) = env("TRIPVOICE_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    /// Directory for rotated log files.
    ///
    /// # Errors
    ///
    /// Returns an error if no directory is configured and the home directory
    /// cannot be determined.
    pub fn logs_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.logging.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(config_dir()?.join("logs")),
        }
    }
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Load `~/.tripvoice/config.toml`, falling back to defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or the file
/// exists but cannot be read or parsed.
pub fn load_default_config() -> anyhow::Result<Config> {
    let path = config_dir()?.join("config.toml");
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file found, using defaults");
        return Ok(Config::default());
    }
    load_config(&path)
}

/// Resolve the default config directory (`~/.tripvoice/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".tripvoice"))
}
