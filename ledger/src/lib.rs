//! Vote Weight Ledger
//!
//! Locked balances, delegation, fee-growth accrual and historical snapshots
//! consumed by the governance engine and by external collaborators.

pub mod account;
pub mod call;
pub mod error;
pub mod ledger;
pub mod roles;
pub mod snapshot;

pub use account::AccountInfo;
pub use call::{LedgerAssets, LedgerCall};
pub use error::{LedgerError, Result};
pub use ledger::WeightLedger;
pub use roles::Role;
pub use snapshot::SnapshotStore;
