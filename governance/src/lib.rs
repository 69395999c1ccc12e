//! Vote Ledger Governance Module
//!
//! Proposal lifecycle on top of the weight ledger: creation gated by locked
//! balance, voting with delegated weight, quorum against the supply at
//! creation, and timelocked execution of encoded actions.

pub mod call;
pub mod config;
pub mod engine;
pub mod error;
pub mod proposal;
pub mod voting;
pub mod weights;

pub use call::GovernanceCall;
pub use config::{ConfigError, DaoConfig};
pub use engine::GovernanceEngine;
pub use error::{GovernanceError, Result};
pub use proposal::{Proposal, ProposalId, ProposalParams, ProposalStatus};
pub use voting::{quorum_threshold, winning_option, Tally};
pub use weights::VotingWeights;
