//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::backend::{BackendConfig, DEFAULT_API_BASE};
use crate::money::Money;
use crate::store::{Language, ShippingPolicy};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub shell: ShellConfig,

    #[serde(default)]
    pub backend: BackendSection,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub shop: ShopConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storefront shell server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ShellConfig {
    /// Socket address to bind, falling back to localhost on a bad host
    pub fn addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], self.port)))
    }
}

/// Shop REST API connection
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl BackendSection {
    pub fn client_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("casapetrada").to_string_lossy().to_string())
        .unwrap_or_else(|| "./casapetrada_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Shop settings shown in and applied by the views
#[derive(Debug, Clone, Deserialize)]
pub struct ShopConfig {
    #[serde(default = "default_shop_name")]
    pub name: String,

    #[serde(default = "default_contact_email")]
    pub contact_email: String,

    /// Flat shipping cost in cents
    #[serde(default = "default_shipping_cents")]
    pub shipping_cents: i64,

    /// Subtotal in cents from which shipping is free
    #[serde(default = "default_free_shipping_cents")]
    pub free_shipping_from_cents: i64,

    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_shop_name() -> String {
    "Casa Petrada".to_string()
}

fn default_contact_email() -> String {
    "info@casapetrada.de".to_string()
}

fn default_shipping_cents() -> i64 {
    490
}

fn default_free_shipping_cents() -> i64 {
    5000
}

fn default_language() -> String {
    "de".to_string()
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            name: default_shop_name(),
            contact_email: default_contact_email(),
            shipping_cents: default_shipping_cents(),
            free_shipping_from_cents: default_free_shipping_cents(),
            default_language: default_language(),
        }
    }
}

impl ShopConfig {
    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy {
            flat_rate: Money::from_cents(self.shipping_cents),
            free_from: Money::from_cents(self.free_shipping_from_cents),
        }
    }

    pub fn language(&self) -> Language {
        Language::parse(&self.default_language).unwrap_or_default()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Filter directive used when `RUST_LOG` is unset
    pub fn directive(&self) -> String {
        format!("casapetrada={},tower_http=info", self.level)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("casapetrada").join("config.toml")),
            Some(PathBuf::from("/etc/casapetrada/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = var("CASAPETRADA_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Some(host) = var("CASAPETRADA_HOST") {
            self.shell.host = host;
        }
        if let Some(port) = var("CASAPETRADA_PORT") {
            match port.parse() {
                Ok(p) => self.shell.port = p,
                Err(_) => tracing::warn!(port = %port, "Ignoring invalid CASAPETRADA_PORT"),
            }
        }

        if let Some(url) = var("CASAPETRADA_API_URL") {
            self.backend.base_url = url;
        }

        if let Some(level) = var("CASAPETRADA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CASAPETRADA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Casa Petrada Storefront Configuration
#
# Environment variables override these settings:
# - CASAPETRADA_DATA_DIR
# - CASAPETRADA_HOST
# - CASAPETRADA_PORT
# - CASAPETRADA_API_URL
# - CASAPETRADA_LOG_LEVEL
# - CASAPETRADA_LOG_FORMAT

[shell]
# Address of the local storefront server
host = "127.0.0.1"
port = 3000

[backend]
# Shop REST API
base_url = "http://localhost:8000/api/v1"

# Request timeout in milliseconds
request_timeout_ms = 10000

[storage]
# Directory holding local_storage.json
data_dir = "~/.local/share/casapetrada"

[shop]
name = "Casa Petrada"
contact_email = "info@casapetrada.de"

# Shipping in cents, free from the given subtotal
shipping_cents = 490
free_shipping_from_cents = 5000

# de or en
default_language = "de"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty, json
format = "pretty"
"#
    .to_string()
}
