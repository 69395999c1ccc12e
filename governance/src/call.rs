//! Encoded entry points of the engine
//!
//! Only reachable as self-calls from an executed proposal.

use serde::{Deserialize, Serialize};

use dao_core::{Action, Address, Amount, CallError, Timestamp};

use crate::proposal::ProposalId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceCall {
    Cancel {
        proposal_id: ProposalId,
    },
    SetMinBalanceToPropose {
        #[serde(with = "dao_core::serde_amount")]
        amount: Amount,
    },
    SetMinQuorumFraction {
        #[serde(with = "dao_core::serde_amount")]
        fraction: Amount,
    },
    SetMinVotingTime {
        seconds: Timestamp,
    },
    SetMinExecutionDelay {
        seconds: Timestamp,
    },
}

impl GovernanceCall {
    /// Wrap this call as an action against the engine at `engine`
    pub fn into_action(self, engine: Address) -> Result<Action, CallError> {
        Action::call(engine, 0, &self)
    }
}
