//! Runtime error types

use thiserror::Error;

use dao_core::{AssetError, CallError};
use dao_ledger::LedgerError;
use governance::GovernanceError;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Governance error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("Call error: {0}")]
    Call(#[from] CallError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
