//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `shutterhub.toml` in the working directory. Most fields have
//! defaults so the file can stay small, but the gateway host and API key
//! and the basic-auth credentials must be provided (file or environment).
//! Environment variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use shutterhub_adapter_http_axum::router::RouterConfig;
use shutterhub_adapter_overkiz::OverkizConfig;
use shutterhub_app::scheduler::SchedulerConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Vendor gateway settings.
    pub gateway: GatewayConfig,
    /// Basic-auth credentials for the REST API.
    pub auth: AuthConfig,
    /// CORS settings.
    pub cors: CorsConfig,
    /// Scheduler tuning.
    pub scheduler: SchedulerSection,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Catalog document locations.
    pub paths: PathsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Vendor gateway connection settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway host (and optional port), without scheme.
    pub host: String,
    /// Value sent as the `X-Auth-Token` header.
    pub api_key: String,
}

/// Basic-auth credentials for the REST API.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

/// CORS allow-list.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API.
    pub allowed_origins: Vec<String>,
}

/// Scheduler tuning knobs.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// Evaluation cadence in milliseconds.
    pub tick_interval_ms: u64,
    /// Debounce window in seconds.
    pub debounce_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Locations of the three catalog documents.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub devices: String,
    pub device_groups: String,
    pub schedules: String,
}

impl Config {
    /// Load configuration from `shutterhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// required values are missing after overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("shutterhub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SHUTTERHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("SHUTTERHUB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("SHUTTERHUB_GATEWAY_HOST") {
            self.gateway.host = val;
        }
        if let Ok(val) = std::env::var("SHUTTERHUB_GATEWAY_API_KEY") {
            self.gateway.api_key = val;
        }
        if let Ok(val) = std::env::var("SHUTTERHUB_AUTH_USERNAME") {
            self.auth.username = val;
        }
        if let Ok(val) = std::env::var("SHUTTERHUB_AUTH_PASSWORD") {
            self.auth.password = val;
        }
        if let Ok(val) = std::env::var("SHUTTERHUB_CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = val.split(',').map(str::to_string).collect();
        }
        if let Ok(val) = std::env::var("SHUTTERHUB_DEVICES_PATH") {
            self.paths.devices = val;
        }
        if let Ok(val) = std::env::var("SHUTTERHUB_DEVICE_GROUPS_PATH") {
            self.paths.device_groups = val;
        }
        if let Ok(val) = std::env::var("SHUTTERHUB_SCHEDULES_PATH") {
            self.paths.schedules = val;
        }
        if let Ok(val) = std::env::var("SHUTTERHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.gateway.host.is_empty() {
            return Err(ConfigError::Validation(
                "gateway host must be configured".to_string(),
            ));
        }
        if self.gateway.api_key.is_empty() {
            return Err(ConfigError::Validation(
                "gateway api key must be configured".to_string(),
            ));
        }
        if self.auth.username.is_empty() || self.auth.password.is_empty() {
            return Err(ConfigError::Validation(
                "basic-auth credentials must be configured".to_string(),
            ));
        }
        if self.scheduler.tick_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "tick interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Vendor gateway settings for the overkiz adapter.
    #[must_use]
    pub fn overkiz_config(&self) -> OverkizConfig {
        OverkizConfig {
            host: self.gateway.host.clone(),
            api_key: self.gateway.api_key.clone(),
        }
    }

    /// Scheduler tuning for the engine.
    #[must_use]
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_millis(self.scheduler.tick_interval_ms),
            debounce_window: Duration::from_secs(self.scheduler.debounce_secs),
        }
    }

    /// Auth and CORS settings for the router.
    #[must_use]
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            username: self.auth.username.clone(),
            password: self.auth.password.clone(),
            allowed_origins: self.cors.allowed_origins.clone(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            debounce_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "shutterhubd=info,shutterhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            devices: "/opt/shutterhub/devices.json".to_string(),
            device_groups: "/opt/shutterhub/deviceGroups.json".to_string(),
            schedules: "/opt/shutterhub/schedules.json".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
