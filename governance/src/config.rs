//! Organization rules
//!
//! Loaded once at construction (TOML) and afterwards amended only by executed
//! proposals.
//!
//! Example:
//! ```toml
//! min_balance_to_propose = "10000000000000000000000"
//! min_quorum_fraction = "100000000000"   # 10% of 10^12
//! min_voting_time = 432000
//! min_execution_delay = 86400
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use dao_core::{units, Amount, Timestamp, PRECISION};

/// Five days
pub const DEFAULT_MIN_VOTING_TIME: Timestamp = 5 * 86_400;

/// One day
pub const DEFAULT_MIN_EXECUTION_DELAY: Timestamp = 86_400;

/// 10% of snapshot supply
pub const DEFAULT_MIN_QUORUM_FRACTION: Amount = PRECISION / 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoConfig {
    #[serde(with = "dao_core::serde_amount")]
    pub min_balance_to_propose: Amount,

    /// Fraction of snapshot supply, scaled by 10^12
    #[serde(with = "dao_core::serde_amount")]
    pub min_quorum_fraction: Amount,

    pub min_voting_time: Timestamp,

    pub min_execution_delay: Timestamp,
}

impl DaoConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DaoConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_quorum_fraction(self.min_quorum_fraction).map_err(ConfigError::Invalid)
    }
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            min_balance_to_propose: units(10_000),
            min_quorum_fraction: DEFAULT_MIN_QUORUM_FRACTION,
            min_voting_time: DEFAULT_MIN_VOTING_TIME,
            min_execution_delay: DEFAULT_MIN_EXECUTION_DELAY,
        }
    }
}

pub(crate) fn validate_quorum_fraction(fraction: Amount) -> Result<(), String> {
    if fraction > PRECISION {
        return Err(format!(
            "min_quorum_fraction {} exceeds {}",
            fraction, PRECISION
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config() {
        let content = r#"
# Organization rules
min_balance_to_propose = "10000000000000000000000"
min_quorum_fraction = 100000000000
min_voting_time = 300
min_execution_delay = 300
"#;
        let config = DaoConfig::from_toml_str(content).unwrap();
        assert_eq!(config.min_balance_to_propose, units(10_000));
        assert_eq!(config.min_quorum_fraction, PRECISION / 10);
        assert_eq!(config.min_voting_time, 300);
        assert_eq!(config.min_execution_delay, 300);
    }

    #[test]
    fn test_reject_quorum_above_one() {
        let content = r#"
min_balance_to_propose = 1
min_quorum_fraction = "1000000000001"
min_voting_time = 1
min_execution_delay = 1
"#;
        assert!(matches!(
            DaoConfig::from_toml_str(content),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_field() {
        assert!(matches!(
            DaoConfig::from_toml_str("min_voting_time = 1"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "min_balance_to_propose = 1\nmin_quorum_fraction = 10\nmin_voting_time = 100\nmin_execution_delay = 10"
        )
        .unwrap();
        let config = DaoConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.min_voting_time, 100);
        assert_eq!(config.min_quorum_fraction, 10);
    }

    #[test]
    fn test_defaults_valid() {
        assert!(DaoConfig::default().validate().is_ok());
    }
}
