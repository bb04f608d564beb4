//! Service configuration
//!
//! Settings come from a YAML file, with `STUDENTS__`-prefixed environment
//! variables layered on top (`STUDENTS__HTTP_SERVER__ADDRESS=...`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "STUDENTS";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file does not exist
    #[error("config file does not exist: {0}")]
    NotFound(PathBuf),

    /// The file or an override could not be parsed
    #[error("cannot read config: {0}")]
    Load(#[from] config::ConfigError),

    /// `log.level` is not a tracing level
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Deployment environment name (`dev`, `prod`, ...)
    pub env: String,
    /// SQLite database file
    pub storage_path: PathBuf,
    /// HTTP listener settings
    pub http_server: HttpServerConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    /// Socket address to bind, e.g. `localhost:8082`
    pub address: String,
    /// How long in-flight requests may run after a shutdown signal
    #[serde(default = "default_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl HttpServerConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

fn default_grace_secs() -> u64 {
    5
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Maximum level (`trace` .. `error`)
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Parsed maximum level
    pub fn max_level(&self) -> Result<Level, ConfigError> {
        self.level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.level.clone()))
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load from `path` with the default environment prefix
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load from `path`, letting `<prefix>__SECTION__KEY` variables override
    pub fn load_with_prefix(path: &Path, prefix: &str) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let config: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.log.max_level()?;
        Ok(config)
    }
}
