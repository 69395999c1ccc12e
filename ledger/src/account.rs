//! Per-account weight record

use serde::{Deserialize, Serialize};

use dao_core::{Address, Amount};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Locked base-asset amount, including realized fee growth
    #[serde(with = "dao_core::serde_amount")]
    pub locked_principal: Amount,

    /// Liquidity-position units held by the ledger for this account
    #[serde(with = "dao_core::serde_amount")]
    pub liquidity_locked_units: Amount,

    /// Weight of the liquidity units, priced when last locked or unlocked
    #[serde(with = "dao_core::serde_amount")]
    pub liquidity_locked_weight: Amount,

    /// Externally attested weight set by the batch grant
    #[serde(with = "dao_core::serde_amount")]
    pub granted_weight: Amount,

    #[serde(with = "dao_core::serde_amount")]
    pub granted_principal_equivalent: Amount,

    /// Zero or the owner means self-held
    pub delegate: Address,

    #[serde(with = "dao_core::serde_amount")]
    pub last_fee_growth: Amount,
}

impl AccountInfo {
    /// `locked_principal + liquidity_locked_weight + granted_weight`
    pub fn checked_balance(&self) -> Option<Amount> {
        self.locked_principal
            .checked_add(self.liquidity_locked_weight)?
            .checked_add(self.granted_weight)
    }

    /// Balance of a committed record; committed records never overflow
    pub fn balance(&self) -> Amount {
        self.checked_balance().unwrap_or(Amount::MAX)
    }

    /// Address credited with this account's votes
    pub fn effective_delegate(&self, owner: &Address) -> Address {
        if self.delegate.is_zero() {
            *owner
        } else {
            self.delegate
        }
    }
}
