use domain::models::alert_settings::{check_thresholds, AlertSettings};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub alerts: AlertDefaultsConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Values written to the alert settings row the first time the service starts.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertDefaultsConfig {
    #[serde(default = "default_lower_threshold")]
    pub default_lower_threshold: i32,

    #[serde(default = "default_upper_threshold")]
    pub default_upper_threshold: i32,

    #[serde(default = "default_true")]
    pub default_active: bool,

    #[serde(default)]
    pub default_email_notifications: bool,

    #[serde(default)]
    pub default_push_notifications: bool,
}

impl Default for AlertDefaultsConfig {
    fn default() -> Self {
        Self {
            default_lower_threshold: default_lower_threshold(),
            default_upper_threshold: default_upper_threshold(),
            default_active: true,
            default_email_notifications: false,
            default_push_notifications: false,
        }
    }
}

impl AlertDefaultsConfig {
    pub fn to_settings(&self) -> AlertSettings {
        AlertSettings {
            lower_threshold: self.default_lower_threshold,
            upper_threshold: self.default_upper_threshold,
            is_active: self.default_active,
            email_notifications: self.default_email_notifications,
            push_notifications: self.default_push_notifications,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Run background jobs in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_network_refresh_minutes")]
    pub network_refresh_minutes: u64,

    #[serde(default = "default_alert_evaluation_minutes")]
    pub alert_evaluation_minutes: u64,

    #[serde(default = "default_pool_metrics_secs")]
    pub pool_metrics_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            network_refresh_minutes: default_network_refresh_minutes(),
            alert_evaluation_minutes: default_alert_evaluation_minutes(),
            pool_metrics_secs: default_pool_metrics_secs(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_lower_threshold() -> i32 {
    domain::models::alert_settings::DEFAULT_LOWER_THRESHOLD
}
fn default_upper_threshold() -> i32 {
    domain::models::alert_settings::DEFAULT_UPPER_THRESHOLD
}
fn default_true() -> bool {
    true
}
fn default_network_refresh_minutes() -> u64 {
    5
}
fn default_alert_evaluation_minutes() -> u64 {
    5
}
fn default_pool_metrics_secs() -> u64 {
    10
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with VM__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("VM").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config from embedded defaults so tests do not depend on
    /// the working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [alerts]
            default_lower_threshold = 30
            default_upper_threshold = 70
            default_active = true
            default_email_notifications = false
            default_push_notifications = false

            [jobs]
            enabled = true
            network_refresh_minutes = 5
            alert_evaluation_minutes = 5
            pool_metrics_secs = 10
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "VM__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        check_thresholds(
            self.alerts.default_lower_threshold,
            self.alerts.default_upper_threshold,
        )
        .map_err(|e| ConfigValidationError::InvalidValue(format!("alerts: {}", e)))?;

        if self.jobs.network_refresh_minutes == 0
            || self.jobs.alert_evaluation_minutes == 0
            || self.jobs.pool_metrics_secs == 0
        {
            return Err(ConfigValidationError::InvalidValue(
                "Job intervals must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
