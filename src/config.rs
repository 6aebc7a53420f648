//! Configuration loader and validator
//!
//! Loads relay settings from an optional TOML file. Every field has a
//! default, so an empty file (or no file at all) is a valid configuration.

use crate::event::VirtualButton;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Host value meaning "every interface" when listening.
pub const ANY_HOST: &str = "*";
pub const DEFAULT_PORT: u16 = 5566;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkSettings,

    #[serde(default)]
    pub capture: CaptureSettings,

    #[serde(default)]
    pub emit: EmitSettings,

    /// Extra or replacement entries for the default button layout
    #[serde(default)]
    pub buttons: HashMap<String, VirtualButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Address to listen on (emit) or to dial (capture)
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// How long the capturing side waits for the emitting side to accept
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Device path or index; prompt when unset
    #[serde(default)]
    pub device: Option<String>,

    /// Take exclusive access to the physical pad
    #[serde(default)]
    pub grab: bool,
}

/// Which virtual controller the emitting side drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// OS virtual pad
    Uinput,
    /// Log actions only
    Log,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitSettings {
    #[serde(default = "default_sink")]
    pub sink: SinkKind,

    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// Full-scale trigger value
    #[serde(default = "default_trigger_max")]
    pub trigger_max: i32,
}

impl Default for EmitSettings {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            device_name: default_device_name(),
            trigger_max: default_trigger_max(),
        }
    }
}

fn default_host() -> String { ANY_HOST.to_string() }
fn default_port() -> u16 { DEFAULT_PORT }
fn default_connect_timeout_ms() -> u64 { 5000 }
fn default_sink() -> SinkKind { SinkKind::Uinput }
fn default_device_name() -> String { "Remote Gamer Virtual Pad".to_string() }
fn default_trigger_max() -> i32 { 255 }

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        info!("Loading configuration from: {}", path_ref.display());

        let content = std::fs::read_to_string(path_ref)?;
        let config = Self::from_toml(&content)?;

        info!("✓ Config parsed successfully");
        debug!("  - Network: {}:{}", config.network.host, config.network.port);
        debug!("  - Sink: {:?}", config.emit.sink);
        debug!("  - Button overrides: {}", config.buttons.len());

        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.host.trim().is_empty() {
            return Err(ConfigError::Invalid("network.host must not be empty".into()));
        }

        if self.network.port == 0 {
            return Err(ConfigError::Invalid("network.port must be between 1 and 65535".into()));
        }

        if self.network.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "network.connect_timeout_ms must be positive".into(),
            ));
        }

        if self.emit.trigger_max <= 0 {
            return Err(ConfigError::Invalid("emit.trigger_max must be positive".into()));
        }

        if self.emit.device_name.trim().is_empty() {
            return Err(ConfigError::Invalid("emit.device_name must not be empty".into()));
        }

        for code in self.buttons.keys() {
            Self::validate_code(code)?;
        }

        Ok(())
    }

    /// Codes are kernel-style mnemonics such as `BTN_SOUTH`
    fn validate_code(code: &str) -> Result<(), ConfigError> {
        let valid = !code.is_empty()
            && code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "Invalid button code '{}': expected an upper-case mnemonic like BTN_SOUTH",
                code
            )))
        }
    }
}
