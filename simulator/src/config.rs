//! Simulator configuration module.
//!
//! Configuration is loaded from environment variables. Every variable is
//! optional.
//!
//! # Environment Variables
//!
//! - `SIMULATOR_LISTEN_PORT`: Port for the control API (default: `4000`)
//! - `SIMULATOR_INGEST_URL`: Remote ingestion endpoint; unset or empty disables the remote sink
//! - `SIMULATOR_TICK_INTERVAL_MS`: Tick period in milliseconds (default: `1000`)
//! - `SIMULATOR_SINK_TIMEOUT_MS`: Per-delivery timeout in milliseconds (default: `500`)
//! - `SIMULATOR_SEED`: Seed for record synthesis; unset draws from the OS
//! - `SIMULATOR_BASELINE`: Start baseline emission at boot (default: `true`)
//!
//! # Invariants
//!
//! - `tick_interval` and `sink_timeout` are never zero
//! - `ingest_url`, when present, is non-empty

use std::time::Duration;

/// Simulator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Port the control API listens on.
    pub listen_port: u16,
    /// Where records are POSTed, if anywhere.
    pub ingest_url: Option<String>,
    pub tick_interval: Duration,
    /// Upper bound on a single sink delivery.
    pub sink_timeout: Duration,
    pub seed: Option<u64>,
    /// Whether baseline emission starts with the process.
    pub baseline_on_start: bool,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            listen_port: Self::DEFAULT_PORT,
            ingest_url: None,
            tick_interval: Duration::from_millis(Self::DEFAULT_TICK_INTERVAL_MS),
            sink_timeout: Duration::from_millis(Self::DEFAULT_SINK_TIMEOUT_MS),
            seed: None,
            baseline_on_start: true,
        }
    }
}

impl SimulatorConfig {
    pub const DEFAULT_PORT: u16 = 4000;
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
    pub const DEFAULT_SINK_TIMEOUT_MS: u64 = 500;

    const LISTEN_PORT: &'static str = "SIMULATOR_LISTEN_PORT";
    const INGEST_URL: &'static str = "SIMULATOR_INGEST_URL";
    const TICK_INTERVAL_MS: &'static str = "SIMULATOR_TICK_INTERVAL_MS";
    const SINK_TIMEOUT_MS: &'static str = "SIMULATOR_SINK_TIMEOUT_MS";
    const SEED: &'static str = "SIMULATOR_SEED";
    const BASELINE: &'static str = "SIMULATOR_BASELINE";

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set to a value that does not
    /// parse or violates its constraint.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`SimulatorConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let listen_port = match lookup(Self::LISTEN_PORT) {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: Self::LISTEN_PORT.to_string(),
                message: format!("'{value}' is not a valid port number (must be 0-65535)"),
            })?,
            None => defaults.listen_port,
        };

        // Empty disables the remote sink, same as unset.
        let ingest_url = lookup(Self::INGEST_URL)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let tick_interval = Self::load_millis(&lookup, Self::TICK_INTERVAL_MS)?
            .unwrap_or(defaults.tick_interval);
        let sink_timeout = Self::load_millis(&lookup, Self::SINK_TIMEOUT_MS)?
            .unwrap_or(defaults.sink_timeout);

        let seed = match lookup(Self::SEED) {
            Some(value) => Some(value.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue {
                    name: Self::SEED.to_string(),
                    message: format!("'{value}' is not an unsigned 64-bit integer"),
                }
            })?),
            None => None,
        };

        let baseline_on_start = match lookup(Self::BASELINE) {
            Some(value) => parse_bool(&value).ok_or_else(|| ConfigError::InvalidValue {
                name: Self::BASELINE.to_string(),
                message: format!("'{value}' is not a boolean"),
            })?,
            None => defaults.baseline_on_start,
        };

        Ok(Self {
            listen_port,
            ingest_url,
            tick_interval,
            sink_timeout,
            seed,
            baseline_on_start,
        })
    }

    /// A positive millisecond duration, or `None` when unset.
    fn load_millis(
        lookup: &impl Fn(&str) -> Option<String>,
        name: &str,
    ) -> Result<Option<Duration>, ConfigError> {
        let Some(value) = lookup(name) else {
            return Ok(None);
        };
        match value.parse::<u64>() {
            Ok(0) => Err(ConfigError::InvalidValue {
                name: name.to_string(),
                message: "must be greater than zero".to_string(),
            }),
            Ok(ms) => Ok(Some(Duration::from_millis(ms))),
            Err(_) => Err(ConfigError::InvalidValue {
                name: name.to_string(),
                message: format!("'{value}' is not a number of milliseconds"),
            }),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
