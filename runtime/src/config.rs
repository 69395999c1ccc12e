//! World configuration (TOML)
//!
//! Example:
//! ```toml
//! admin = "0x0000000000000000000000000000000000000001"
//! start_time = 0
//!
//! [addresses]
//! ledger = "0x0000000000000000000000000000000000000032"
//! engine = "0x000000000000000000000000000000000000003c"
//! base_token = "0x0000000000000000000000000000000000000064"
//! pool_token = "0x00000000000000000000000000000000000000c8"
//!
//! [dao]
//! min_balance_to_propose = "10000000000000000000000"
//! min_quorum_fraction = "100000000000"
//! min_voting_time = 432000
//! min_execution_delay = 86400
//!
//! [pool]
//! base_reserve = "2500000000000000000000"
//!
//! [[genesis]]
//! account = "0x0000000000000000000000000000000000000002"
//! tokens = "20000000000000000000000"
//! liquidity = "1000000000000000000000"
//! native = "10000000000000000000"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use dao_core::{Address, Amount, Timestamp};
use governance::DaoConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid DAO rules: {0}")]
    Dao(#[from] governance::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where each component lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addresses {
    pub ledger: Address,
    pub engine: Address,
    pub base_token: Address,
    pub pool_token: Address,
}

impl Addresses {
    fn all(&self) -> [(&'static str, Address); 4] {
        [
            ("ledger", self.ledger),
            ("engine", self.engine),
            ("base_token", self.base_token),
            ("pool_token", self.pool_token),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(with = "dao_core::serde_amount", default)]
    pub base_reserve: Amount,
}

/// Starting holdings of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub account: Address,

    /// Base-token balance
    #[serde(with = "dao_core::serde_amount", default)]
    pub tokens: Amount,

    /// Liquidity-position units
    #[serde(with = "dao_core::serde_amount", default)]
    pub liquidity: Amount,

    /// Native value
    #[serde(with = "dao_core::serde_amount", default)]
    pub native: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Holds every ledger role at genesis
    pub admin: Address,

    #[serde(default)]
    pub start_time: Timestamp,

    pub addresses: Addresses,

    #[serde(default)]
    pub dao: DaoConfig,

    #[serde(default)]
    pub pool: PoolConfig,

    #[serde(default)]
    pub genesis: Vec<Allocation>,
}

impl RuntimeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dao.validate()?;

        if self.admin.is_zero() {
            return Err(ConfigError::Invalid("admin must be non-zero".to_string()));
        }
        let mut seen = HashSet::new();
        for (name, address) in self.addresses.all() {
            if address.is_zero() {
                return Err(ConfigError::Invalid(format!("{} address must be non-zero", name)));
            }
            if !seen.insert(address) {
                return Err(ConfigError::Invalid(format!(
                    "{} address {} is already in use",
                    name, address
                )));
            }
        }

        let mut accounts = HashSet::new();
        for allocation in &self.genesis {
            if !accounts.insert(allocation.account) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate genesis account: {}",
                    allocation.account
                )));
            }
        }
        Ok(())
    }
}
