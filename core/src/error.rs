//! Core error types

use thiserror::Error;

use crate::address::Address;
use crate::Amount;

/// Asset transfer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Insufficient balance for {account}: requested {requested}, available {available}")]
    InsufficientBalance {
        account: Address,
        requested: Amount,
        available: Amount,
    },

    #[error("Amount overflow")]
    Overflow,
}

/// Errors surfaced by the generic call capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Unknown call target: {0}")]
    UnknownTarget(Address),

    #[error("Insufficient value: requested {requested}, available {available}")]
    InsufficientValue { requested: Amount, available: Amount },

    #[error("Payload decode failed: {0}")]
    Decode(String),

    #[error("Call reverted: {0}")]
    Reverted(String),
}
