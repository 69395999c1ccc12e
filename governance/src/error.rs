//! Governance error types

use thiserror::Error;

use dao_core::{Address, Amount, CallError, Timestamp};
use dao_ledger::LedgerError;

use crate::proposal::ProposalId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    // Authorization
    #[error("Only the organization itself may call this")]
    NotSelfCall { caller: Address },

    // Proposal shape
    #[error("Insufficient balance to propose: required {required}, available {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error("Voting time {given}s below minimum {minimum}s")]
    VotingTimeTooShort { given: Timestamp, minimum: Timestamp },

    #[error("Execution delay {given}s below minimum {minimum}s")]
    ExecutionDelayTooShort { given: Timestamp, minimum: Timestamp },

    #[error("Option count {options} does not match action list count {action_lists}")]
    OptionLengthMismatch { options: usize, action_lists: usize },

    #[error("At least 2 options required, got {0}")]
    TooFewOptions(usize),

    #[error("Option {option} has {count} actions, maximum is {max}")]
    TooManyActions { option: usize, count: usize, max: usize },

    #[error("Last option must have no actions")]
    NoOpOptionHasActions,

    #[error("Proposal {0} is still live, one live proposal max")]
    LiveProposalExists(ProposalId),

    // Lifecycle
    #[error("Proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    #[error("Already voted on proposal {proposal}: {voter}")]
    AlreadyVoted { proposal: ProposalId, voter: Address },

    #[error("Voting closed for proposal {proposal} at {ended_at}")]
    VotingClosed { proposal: ProposalId, ended_at: Timestamp },

    #[error("Invalid option {option} for proposal {proposal}")]
    InvalidOption { proposal: ProposalId, option: usize },

    #[error("Proposal {0} already executed")]
    AlreadyExecuted(ProposalId),

    #[error("Proposal {0} cancelled")]
    ProposalCancelled(ProposalId),

    #[error("Proposal {proposal} not yet executable: executable at {executable_at}, now {now}")]
    NotYetExecutable {
        proposal: ProposalId,
        executable_at: Timestamp,
        now: Timestamp,
    },

    #[error("Not at quorum: winning option has {votes}, {required} required")]
    QuorumNotReached { votes: Amount, required: Amount },

    #[error("Action {index} failed: {source}")]
    ActionFailed {
        index: usize,
        #[source]
        source: CallError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Call error: {0}")]
    Call(#[from] CallError),
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
