mod env;

use crate::ingest::HandlerOptions;
use crate::vocabulary::{Preset, Vocabulary};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Complete bridge configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Controller-facing TCP socket
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_bind_host")]
    pub host: String,
    #[serde(default = "default_tcp_port")]
    pub port: u16,
    /// Upper bound of a single read; one read is one message
    #[serde(default = "default_read_buffer_bytes")]
    pub read_buffer_bytes: usize,
    /// Drop connections silent for this long (unset: wait forever)
    #[serde(default)]
    pub idle_timeout_seconds: Option<u64>,
    /// Acknowledge unrecognised codes too
    #[serde(default)]
    pub ack_invalid: bool,
    #[serde(default = "default_ack_payload")]
    pub ack_payload: String,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_tcp_port() -> u16 {
    30002
}

fn default_read_buffer_bytes() -> usize {
    1024
}

fn default_ack_payload() -> String {
    "OK".to_string()
}

impl IngestConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_seconds.map(Duration::from_secs)
    }

    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            ack_payload: self.ack_payload.as_bytes().to_vec(),
            ack_invalid: self.ack_invalid,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            host: default_bind_host(),
            port: default_tcp_port(),
            read_buffer_bytes: default_read_buffer_bytes(),
            idle_timeout_seconds: None,
            ack_invalid: false,
            ack_payload: default_ack_payload(),
        }
    }
}

/// Query HTTP server
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    /// Auto-refresh interval of the history page
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,
}

fn default_http_port() -> u16 {
    5000
}

fn default_refresh_seconds() -> u64 {
    5
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_bind_host(),
            port: default_http_port(),
            refresh_seconds: default_refresh_seconds(),
        }
    }
}

/// Initial state of the tracker
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_sentinel_label")]
    pub sentinel_label: String,
    /// Start the history with one sentinel entry
    #[serde(default = "default_seed_with_sentinel")]
    pub seed_with_sentinel: bool,
}

fn default_sentinel_label() -> String {
    "NI_PODATKOV".to_string()
}

fn default_seed_with_sentinel() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            sentinel_label: default_sentinel_label(),
            seed_with_sentinel: default_seed_with_sentinel(),
        }
    }
}

/// Code table selection. An explicit `codes` table replaces the preset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VocabularyConfig {
    #[serde(default)]
    pub preset: Preset,
    #[serde(default)]
    pub codes: Option<HashMap<String, String>>,
}

impl VocabularyConfig {
    pub fn build(&self) -> Vocabulary {
        match &self.codes {
            Some(codes) => Vocabulary::new(codes.clone()),
            None => Vocabulary::from_preset(self.preset),
        }
    }
}

/// Synthetic controller for demos without a robot cell
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_simulation_interval")]
    pub interval_seconds: u64,
}

fn default_simulation_interval() -> u64 {
    4
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: default_simulation_interval(),
        }
    }
}

/// Configuration rejected at startup
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroReadBuffer,
    ZeroIdleTimeout,
    ZeroRefreshInterval,
    EmptyVocabulary,
    EmptyCode,
    ZeroSimulationInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroReadBuffer => write!(f, "ingest.read_buffer_bytes must be positive"),
            ConfigError::ZeroIdleTimeout => {
                write!(f, "ingest.idle_timeout_seconds must be positive when set")
            }
            ConfigError::ZeroRefreshInterval => write!(f, "http.refresh_seconds must be positive"),
            ConfigError::EmptyVocabulary => write!(f, "vocabulary has no codes"),
            ConfigError::EmptyCode => write!(f, "vocabulary contains an empty code"),
            ConfigError::ZeroSimulationInterval => {
                write!(f, "simulation.interval_seconds must be positive")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl BridgeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest.read_buffer_bytes == 0 {
            return Err(ConfigError::ZeroReadBuffer);
        }
        if self.ingest.idle_timeout_seconds == Some(0) {
            return Err(ConfigError::ZeroIdleTimeout);
        }
        if self.http.refresh_seconds == 0 {
            return Err(ConfigError::ZeroRefreshInterval);
        }

        let vocabulary = self.vocabulary.build();
        if vocabulary.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }
        if vocabulary.codes().iter().any(|code| code.trim().is_empty()) {
            return Err(ConfigError::EmptyCode);
        }

        if self.simulation.enabled && self.simulation.interval_seconds == 0 {
            return Err(ConfigError::ZeroSimulationInterval);
        }

        Ok(())
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: BridgeConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Resolve the full startup configuration.
///
/// File (if given) first, then environment overrides, then validation.
pub fn resolve(path: Option<&str>) -> Result<BridgeConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    env::apply_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
