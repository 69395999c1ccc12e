//! Encoded entry points of the ledger
//!
//! Actions targeting the ledger carry a `bincode`-encoded [`LedgerCall`] as
//! their payload.

use serde::{Deserialize, Serialize};

use dao_core::{Action, Address, Amount, Asset, CallContext, CallError, LiquidityPool, SnapshotId};

use crate::error::Result;
use crate::ledger::WeightLedger;
use crate::roles::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCall {
    Lock {
        #[serde(with = "dao_core::serde_amount")]
        amount: Amount,
    },
    Unlock {
        #[serde(with = "dao_core::serde_amount")]
        amount: Amount,
    },
    LockLiquidity {
        #[serde(with = "dao_core::serde_amount")]
        units: Amount,
    },
    UnlockLiquidity {
        #[serde(with = "dao_core::serde_amount")]
        units: Amount,
    },
    Delegate {
        to: Address,
    },
    Donate {
        #[serde(with = "dao_core::serde_amount")]
        amount: Amount,
    },
    GrantWeight {
        accounts: Vec<Address>,
        #[serde(with = "dao_core::serde_amount::vec")]
        principal_equivalents: Vec<Amount>,
        #[serde(with = "dao_core::serde_amount::vec")]
        weights: Vec<Amount>,
    },
    Snapshot,
    GrantRole {
        role: Role,
        account: Address,
    },
    RevokeRole {
        role: Role,
        account: Address,
    },
}

impl LedgerCall {
    /// Wrap this call as an action against `ledger`
    pub fn into_action(self, ledger: Address) -> std::result::Result<Action, CallError> {
        Action::call(ledger, 0, &self)
    }
}

/// The assets a ledger call may move
pub struct LedgerAssets<'a> {
    pub base: &'a mut dyn Asset,
    pub pool: &'a mut dyn LiquidityPool,
}

impl WeightLedger {
    /// Run a decoded call. Returns the minted id for `Snapshot`.
    pub fn dispatch(
        &mut self,
        ctx: &CallContext,
        call: LedgerCall,
        assets: LedgerAssets<'_>,
    ) -> Result<Option<SnapshotId>> {
        match call {
            LedgerCall::Lock { amount } => self.lock(ctx, assets.base, amount)?,
            LedgerCall::Unlock { amount } => self.unlock(ctx, assets.base, amount)?,
            LedgerCall::LockLiquidity { units } => self.lock_liquidity(ctx, assets.pool, units)?,
            LedgerCall::UnlockLiquidity { units } => self.unlock_liquidity(ctx, assets.pool, units)?,
            LedgerCall::Delegate { to } => self.delegate(ctx, to)?,
            LedgerCall::Donate { amount } => self.donate(ctx, assets.base, amount)?,
            LedgerCall::GrantWeight {
                accounts,
                principal_equivalents,
                weights,
            } => self.grant_weight(ctx, &accounts, &principal_equivalents, &weights)?,
            LedgerCall::Snapshot => return self.snapshot(ctx).map(Some),
            LedgerCall::GrantRole { role, account } => self.grant_role(ctx, role, account)?,
            LedgerCall::RevokeRole { role, account } => self.revoke_role(ctx, role, account)?,
        }
        Ok(None)
    }
}
