//! Bridge configuration.
//!
//! Read once by `chainbridge_init` from the YAML file named by the
//! `CHAINBRIDGE_CONFIG` environment variable. Without the variable the
//! defaults apply.

use std::path::{Path, PathBuf};

use chainbridge_engine::LedgerConfig;
use chainbridge_primitives::GenesisAccount;
use serde::{Deserialize, Serialize};

/// Environment variable holding the config file path.
pub const CONFIG_ENV: &str = "CHAINBRIDGE_CONFIG";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),

    #[error("min_validator_stake must be > 0")]
    ZeroMinStake,

    #[error("genesis account {0} has an empty address")]
    EmptyGenesisAddress(usize),
}

/// Configuration applied to the whole bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Default tracing filter when `RUST_LOG` is unset. Default: "warn".
    pub log_level: String,

    /// Whether ledgers may seal empty blocks. Default: false.
    pub allow_empty_blocks: bool,

    /// Smallest stake accepted by `add_validator`. Default: 1.
    pub min_validator_stake: u64,

    /// Accounts seeded into every new ledger.
    pub genesis_accounts: Vec<GenesisAccount>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let ledger = LedgerConfig::default();
        Self {
            log_level: "warn".into(),
            allow_empty_blocks: ledger.allow_empty_blocks,
            min_validator_stake: ledger.min_validator_stake,
            genesis_accounts: Vec::new(),
        }
    }
}

impl BridgeConfig {
    /// Load from `CHAINBRIDGE_CONFIG`, or defaults when it is unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        if self.min_validator_stake == 0 {
            return Err(ConfigError::ZeroMinStake);
        }
        if let Some(idx) = self.genesis_accounts.iter().position(|a| a.address.is_empty()) {
            return Err(ConfigError::EmptyGenesisAddress(idx));
        }
        Ok(())
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            allow_empty_blocks: self.allow_empty_blocks,
            min_validator_stake: self.min_validator_stake,
        }
    }
}
