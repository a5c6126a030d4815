use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use crate::error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rpc: RpcConfig,
    pub watcher: WatcherConfig,
    pub logging: LoggingConfig,
}

/// Node connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL (HTTP)
    pub endpoint: String,
    /// WebSocket endpoint URL. Accepted and validated, never dialed.
    pub ws_endpoint: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Block watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// How often the node's block height is polled, in milliseconds
    pub poll_interval_ms: u64,
    /// Decimals between the smallest currency unit and the display unit
    pub display_decimals: u32,
    /// Symbol appended to formatted values
    pub currency_symbol: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8545".to_string(),
            ws_endpoint: None,
            timeout_seconds: 30,
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 4000,
            display_decimals: 18,
            currency_symbol: "ETH".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Values given on the command line. They win over the file and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit configuration file; unlike `CONFIG_FILE`, it must exist
    pub config_file: Option<String>,
    pub rpc_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
}

impl AppConfig {
    /// Load configuration from file and environment variables.
    /// Environment variables take precedence over file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&ConfigOverrides::default())
    }

    /// Layer file, environment and command-line values, then validate once
    pub fn load_with(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match &overrides.config_file {
            Some(path) => Self::load_required_file(path)?,
            None => {
                let config_path = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
                Self::load_from_file(&config_path)?
            }
        };
        config.apply_env_overrides()?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file; a missing file yields the defaults
    pub fn load_from_file(config_path: &str) -> Result<Self, ConfigError> {
        if !Path::new(config_path).exists() {
            return Ok(Self::default());
        }
        Self::load_required_file(config_path)
    }

    /// Load configuration from a TOML file that has to exist
    pub fn load_required_file(config_path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(config_path)
            .map_err(|_| ConfigError::FileNotFound(config_path.to_string()))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::Parsing(e.to_string()))
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(rpc_url) = &overrides.rpc_url {
            self.rpc.endpoint = rpc_url.clone();
        }
        if let Some(poll_interval_ms) = overrides.poll_interval_ms {
            self.watcher.poll_interval_ms = poll_interval_ms;
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(endpoint) = env::var("RPC_URL") {
            self.rpc.endpoint = endpoint;
        }
        if let Ok(ws_endpoint) = env::var("WS_RPC_URL") {
            self.rpc.ws_endpoint = Some(ws_endpoint);
        }
        if let Ok(timeout) = env::var("RPC_TIMEOUT_SECONDS") {
            self.rpc.timeout_seconds = timeout.parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "RPC_TIMEOUT_SECONDS".to_string(),
                    value: timeout,
                })?;
        }

        if let Ok(interval) = env::var("POLL_INTERVAL_MS") {
            self.watcher.poll_interval_ms = interval.parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "POLL_INTERVAL_MS".to_string(),
                    value: interval,
                })?;
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rpc.endpoint.starts_with("http://") && !self.rpc.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(self.rpc.endpoint.clone()));
        }

        if let Some(ws_endpoint) = &self.rpc.ws_endpoint {
            if !ws_endpoint.starts_with("ws://") && !ws_endpoint.starts_with("wss://") {
                return Err(ConfigError::InvalidUrl(ws_endpoint.clone()));
            }
        }

        if self.rpc.timeout_seconds == 0 || self.rpc.timeout_seconds > 300 {
            return Err(ConfigError::InvalidValue {
                key: "rpc.timeout_seconds".to_string(),
                value: self.rpc.timeout_seconds.to_string(),
            });
        }

        if self.watcher.poll_interval_ms < 100 || self.watcher.poll_interval_ms > 300_000 {
            return Err(ConfigError::InvalidValue {
                key: "watcher.poll_interval_ms".to_string(),
                value: self.watcher.poll_interval_ms.to_string(),
            });
        }

        // 10^38 still fits in a u128
        if self.watcher.display_decimals > 38 {
            return Err(ConfigError::InvalidValue {
                key: "watcher.display_decimals".to_string(),
                value: self.watcher.display_decimals.to_string(),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                value: self.logging.format.clone(),
            });
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample_config() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Self::default())
            .map_err(|e| ConfigError::Parsing(e.to_string()))
    }
}
