//! Serializable summary of a world

use serde::Serialize;

use dao_core::{Address, Amount, SnapshotId, Timestamp};
use governance::{ProposalId, ProposalStatus};

use crate::world::World;

#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub address: Address,
    #[serde(with = "dao_core::serde_amount")]
    pub balance: Amount,
    #[serde(with = "dao_core::serde_amount")]
    pub votes: Amount,
    #[serde(with = "dao_core::serde_amount")]
    pub locked_principal: Amount,
    #[serde(with = "dao_core::serde_amount")]
    pub liquidity_locked_units: Amount,
    #[serde(with = "dao_core::serde_amount")]
    pub granted_weight: Amount,
    pub delegate: Address,
    #[serde(with = "dao_core::serde_amount")]
    pub tokens: Amount,
    #[serde(with = "dao_core::serde_amount")]
    pub native: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposalReport {
    pub id: ProposalId,
    pub title: String,
    pub status: ProposalStatus,
    pub options: Vec<String>,
    #[serde(with = "dao_core::serde_amount::vec")]
    pub votes_by_option: Vec<Amount>,
    pub snapshot_id: SnapshotId,
    pub voting_ends_at: Timestamp,
    pub executable_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldReport {
    pub now: Timestamp,
    pub snapshot_id: SnapshotId,
    #[serde(with = "dao_core::serde_amount")]
    pub total_supply: Amount,
    #[serde(with = "dao_core::serde_amount")]
    pub fee_growth: Amount,
    #[serde(with = "dao_core::serde_amount")]
    pub engine_native: Amount,
    pub accounts: Vec<AccountReport>,
    pub proposals: Vec<ProposalReport>,
}

impl World {
    /// Summarize the world for the given accounts
    pub fn report(&self, accounts: &[Address]) -> WorldReport {
        let ledger = self.ledger();
        WorldReport {
            now: self.now(),
            snapshot_id: ledger.current_snapshot_id(),
            total_supply: ledger.total_supply(),
            fee_growth: ledger.fee_growth(),
            engine_native: self.native_balance(&self.engine().address()),
            accounts: accounts
                .iter()
                .map(|address| {
                    let info = ledger.account(address);
                    AccountReport {
                        address: *address,
                        balance: ledger.balance_of(address),
                        votes: ledger.votes(address),
                        locked_principal: info.locked_principal,
                        liquidity_locked_units: info.liquidity_locked_units,
                        granted_weight: info.granted_weight,
                        delegate: info.effective_delegate(address),
                        tokens: self.token_balance(address),
                        native: self.native_balance(address),
                    }
                })
                .collect(),
            proposals: self
                .engine()
                .proposals()
                .iter()
                .map(|p| ProposalReport {
                    id: p.id,
                    title: p.title.clone(),
                    status: p.status(),
                    options: p.options.clone(),
                    votes_by_option: p.votes_by_option.clone(),
                    snapshot_id: p.snapshot_id,
                    voting_ends_at: p.voting_ends_at,
                    executable_at: p.executable_at,
                })
                .collect(),
        }
    }
}
