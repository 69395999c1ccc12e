//! Vote Ledger Core Library
//!
//! Shared primitives for the weight ledger and the governance engine:
//! addresses, fixed-point constants, encoded actions, and the asset
//! capabilities the ledger pulls funds through.

pub mod action;
pub mod address;
pub mod asset;
pub mod error;
pub mod math;
pub mod serde_amount;

pub use action::{Action, CallContext, CallHost, TxId};
pub use address::Address;
pub use asset::{Asset, LiquidityPool, MemoryPool, MemoryToken};
pub use error::{AssetError, CallError};
pub use math::mul_div;

/// Raw token amount (18-decimal fixed point for the reference tokens)
pub type Amount = u128;

/// Seconds since an arbitrary epoch supplied by the host
pub type Timestamp = u64;

/// Snapshot boundary identifier
pub type SnapshotId = u64;

/// Fixed-point scale for fee growth and quorum fractions (10^12)
pub const PRECISION: Amount = 1_000_000_000_000;

/// One whole token at 18 decimals
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Maximum actions attached to a single proposal option
pub const MAX_ACTIONS_PER_OPTION: usize = 10;

/// Convert whole tokens to raw units
pub const fn units(whole: u128) -> Amount {
    whole * UNIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(PRECISION, 10u128.pow(12));
        assert_eq!(UNIT, 10u128.pow(18));
        assert_eq!(units(500), 500 * UNIT);
        assert_eq!(MAX_ACTIONS_PER_OPTION, 10);
    }
}
