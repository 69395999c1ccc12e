//! Ledger error types

use thiserror::Error;

use dao_core::{Address, Amount, AssetError, SnapshotId};

use crate::roles::Role;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Missing role {role:?} for {account}")]
    Unauthorized { account: Address, role: Role },

    #[error("Insufficient locked balance: requested {requested}, available {available}")]
    InsufficientLocked { requested: Amount, available: Amount },

    #[error("Insufficient locked liquidity: requested {requested}, available {available}")]
    InsufficientLiquidityLocked { requested: Amount, available: Amount },

    #[error("No lock-unlock in same transaction for {0}")]
    SameTransactionLockUnlock(Address),

    #[error("Nonexistent snapshot {requested} (current {current})")]
    InvalidSnapshot {
        requested: SnapshotId,
        current: SnapshotId,
    },

    #[error("Length mismatch: {accounts} accounts, {principal_equivalents} principal equivalents, {weights} weights")]
    LengthMismatch {
        accounts: usize,
        principal_equivalents: usize,
        weights: usize,
    },

    #[error("Token {0} is not the locked asset")]
    UnexpectedToken(Address),

    #[error("Liquidity pool has no supply")]
    EmptyLiquidityPool,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
