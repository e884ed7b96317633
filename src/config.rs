//! Configuration management for bc-wallet
//!
//! A [`LedgerConfig`] is read once at startup (from TOML, or defaults when no
//! file is given), validated, and then only ever borrowed.

use crate::crypto::Sha256Hash;
use crate::error::{LedgerError, Result};
use crate::mempool::DEFAULT_MAX_PENDING;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pending: default_max_pending(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// `previous_hash` of the first block, as 64 hex characters.
    #[serde(default = "default_genesis_previous_hash")]
    pub genesis_previous_hash: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            genesis_previous_hash: default_genesis_previous_hash(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_max_pending() -> usize {
    DEFAULT_MAX_PENDING
}

fn default_genesis_previous_hash() -> String {
    hex::encode([0u8; 32])
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl LedgerConfig {
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: LedgerConfig =
            toml::from_str(config_str).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        Self::from_toml_str(&config_str)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool.max_pending == 0 {
            return Err(LedgerError::Config(
                "pool.max_pending must be greater than zero".to_string(),
            ));
        }
        self.genesis_previous_hash()?;
        Ok(())
    }

    /// Decoded `chain.genesis_previous_hash`.
    pub fn genesis_previous_hash(&self) -> Result<Sha256Hash> {
        let text = &self.chain.genesis_previous_hash;
        let bytes = hex::decode(text).map_err(|e| {
            LedgerError::Config(format!("chain.genesis_previous_hash is not hex: {}", e))
        })?;
        bytes.try_into().map_err(|bytes: Vec<u8>| {
            LedgerError::Config(format!(
                "chain.genesis_previous_hash must be 32 bytes, got {}",
                bytes.len()
            ))
        })
    }
}
