//! Proposal types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use dao_core::{Action, Address, Amount, SnapshotId, Timestamp, MAX_ACTIONS_PER_OPTION};

use crate::config::DaoConfig;
use crate::error::{GovernanceError, Result};
use crate::voting::Tally;

/// Sequential, starting at 1
pub type ProposalId = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProposalStatus {
    /// Open for votes or awaiting execution; never expires
    Active,
    Executed,
    Cancelled,
}

/// What a proposer submits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposalParams {
    pub title: String,
    pub description: String,
    pub voting_time: Timestamp,
    pub execution_delay: Timestamp,
    pub options: Vec<String>,
    pub actions_by_option: Vec<Vec<Action>>,
}

impl ProposalParams {
    /// Shape and timing checks against the current rules. Balance and the
    /// live-proposal slot are checked by the engine.
    pub fn validate(&self, config: &DaoConfig) -> Result<()> {
        if self.voting_time < config.min_voting_time {
            return Err(GovernanceError::VotingTimeTooShort {
                given: self.voting_time,
                minimum: config.min_voting_time,
            });
        }
        if self.execution_delay < config.min_execution_delay {
            return Err(GovernanceError::ExecutionDelayTooShort {
                given: self.execution_delay,
                minimum: config.min_execution_delay,
            });
        }
        if self.options.len() != self.actions_by_option.len() {
            return Err(GovernanceError::OptionLengthMismatch {
                options: self.options.len(),
                action_lists: self.actions_by_option.len(),
            });
        }
        if self.options.len() < 2 {
            return Err(GovernanceError::TooFewOptions(self.options.len()));
        }
        for (option, actions) in self.actions_by_option.iter().enumerate() {
            if actions.len() > MAX_ACTIONS_PER_OPTION {
                return Err(GovernanceError::TooManyActions {
                    option,
                    count: actions.len(),
                    max: MAX_ACTIONS_PER_OPTION,
                });
            }
        }
        // the last option is always "do nothing"
        if self
            .actions_by_option
            .last()
            .is_some_and(|actions| !actions.is_empty())
        {
            return Err(GovernanceError::NoOpOptionHasActions);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
    pub voting_ends_at: Timestamp,
    pub executable_at: Timestamp,
    pub snapshot_id: SnapshotId,
    #[serde(with = "dao_core::serde_amount")]
    pub snapshot_total_supply: Amount,
    pub options: Vec<String>,
    pub actions_by_option: Vec<Vec<Action>>,
    #[serde(with = "dao_core::serde_amount::vec")]
    pub votes_by_option: Vec<Amount>,
    pub voters: BTreeSet<Address>,
    pub executed: bool,
    pub cancelled: bool,
}

impl Proposal {
    pub(crate) fn new(
        id: ProposalId,
        proposer: Address,
        now: Timestamp,
        snapshot_id: SnapshotId,
        snapshot_total_supply: Amount,
        params: ProposalParams,
    ) -> Self {
        let voting_ends_at = now.saturating_add(params.voting_time);
        Self {
            id,
            proposer,
            title: params.title,
            description: params.description,
            created_at: now,
            voting_ends_at,
            executable_at: voting_ends_at.saturating_add(params.execution_delay),
            snapshot_id,
            snapshot_total_supply,
            votes_by_option: vec![0; params.options.len()],
            options: params.options,
            actions_by_option: params.actions_by_option,
            voters: BTreeSet::new(),
            executed: false,
            cancelled: false,
        }
    }

    pub fn status(&self) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if self.cancelled {
            ProposalStatus::Cancelled
        } else {
            ProposalStatus::Active
        }
    }

    pub fn is_live(&self) -> bool {
        self.status() == ProposalStatus::Active
    }

    pub fn accepts_votes(&self, now: Timestamp) -> bool {
        now < self.voting_ends_at
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains(voter)
    }

    /// Tally under the given quorum fraction
    pub fn tally(&self, min_quorum_fraction: Amount) -> Tally {
        Tally::compute(
            &self.votes_by_option,
            self.snapshot_total_supply,
            min_quorum_fraction,
        )
    }
}
