//! Configuration management for FrameChain

use crate::error::ChainError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub genesis: GenesisConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GenesisConfig {
    #[serde(default = "default_seed")]
    pub seed: String,
}

impl GenesisConfig {
    /// The genesis record: the seed text followed by a single NUL byte.
    pub fn seed_record(&self) -> Vec<u8> {
        let mut record = Vec::with_capacity(self.seed.len() + 1);
        record.extend_from_slice(self.seed.as_bytes());
        record.push(0);
        record
    }
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

/// Store limits. Zero means no limit.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    #[serde(default)]
    pub max_frames: usize,
    #[serde(default)]
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_seed() -> String {
    "this is the first block".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

/// Load `config.toml` from the working directory, falling back to defaults
/// when it is absent.
pub fn load_config() -> Result<Config, ChainError> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let path = path.as_ref();
    let config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        parse_config(&config_str)?
    } else {
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

pub fn parse_config(config_str: &str) -> Result<Config, ChainError> {
    let config: Config = toml::from_str(config_str)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ChainError> {
    if config.genesis.seed.is_empty() {
        return Err(ChainError::ConfigError(
            "genesis.seed must not be empty".to_string(),
        ));
    }
    if config.logging.level.trim().is_empty() {
        return Err(ChainError::ConfigError(
            "logging.level must not be empty".to_string(),
        ));
    }
    Ok(())
}
