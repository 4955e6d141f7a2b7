//! Check configuration
//!
//! Loaded from a TOML file with one table per section:
//!
//! ```toml
//! [influx]
//! url = "http://localhost"
//! port = 8086
//! username = "reader"
//! password = "secret"
//! database = "sensors"
//! tag = "probe-1"
//! number = 10
//!
//! [outlierfilter]
//! deviations = 3.0
//!
//! [failurethreshold]
//! minimum = 10.0
//! maximum = 90.0
//!
//! [unit]
//! unit = "C"
//!
//! [email]
//! sender = "monitor@example.com"
//! password = "app-password"
//! recipient = "ops@example.com, oncall@example.com"
//! subject = "Sensor warning"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::Thresholds;

/// Environment variable consulted when no path is given on the command line
pub const CONFIG_ENV_VAR: &str = "SENSORWATCH_CONFIG";

/// Config file used when neither the CLI nor the environment names one
pub const DEFAULT_CONFIG_PATH: &str = "sensorwatch.toml";

/// Full check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub influx: InfluxConfig,
    pub outlierfilter: OutlierFilterConfig,
    pub failurethreshold: Thresholds,
    pub unit: UnitConfig,
    pub email: EmailConfig,
}

/// Time-series store connection and query window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluxConfig {
    /// Host URL, with or without scheme
    pub url: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    /// Channel name the readings are tagged with
    pub tag: String,
    /// Number of most recent readings to fetch
    pub number: usize,
    /// Measurement holding the readings
    #[serde(default = "default_measurement")]
    pub measurement: String,
    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_measurement() -> String {
    "temperature".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl InfluxConfig {
    /// Base URL of the store, `scheme://host:port`
    pub fn base_url(&self) -> String {
        let url = self.url.trim_end_matches('/');
        if url.contains("://") {
            format!("{}:{}", url, self.port)
        } else {
            format!("http://{}:{}", url, self.port)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierFilterConfig {
    /// Number of scaled deviations around the median
    pub deviations: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitConfig {
    pub unit: String,
}

/// Notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub sender: String,
    pub password: String,
    /// Comma-separated recipient addresses
    pub recipient: String,
    pub subject: String,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

impl EmailConfig {
    /// Split the recipient field into individual addresses
    pub fn recipients(&self) -> Vec<String> {
        self.recipient
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

impl Config {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config path: explicit argument, then environment, then default
    pub fn resolve_path(arg: Option<String>) -> PathBuf {
        arg.or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    // Threshold ordering is deliberately left unchecked.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.influx.number == 0 {
            return Err(ConfigError::Invalid(
                "influx.number must be greater than zero".to_string(),
            ));
        }
        let deviations = self.outlierfilter.deviations;
        if !deviations.is_finite() || deviations <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "outlierfilter.deviations must be positive, got {}",
                deviations
            )));
        }
        if self.email.recipients().is_empty() {
            return Err(ConfigError::Invalid(
                "email.recipient must name at least one address".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
