//! Governance engine
//!
//! Proposals are gated by live balance, voted on with live delegated weight,
//! and executed once their timelock passes if the winning option reaches
//! quorum against the supply recorded at creation. Executing a proposal
//! performs its winning option's actions in order; a failing action undoes
//! the whole execution.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use dao_core::{Action, Address, Amount, CallContext, CallError, CallHost, Timestamp};

use crate::call::GovernanceCall;
use crate::config::{validate_quorum_fraction, DaoConfig};
use crate::error::{GovernanceError, Result};
use crate::proposal::{Proposal, ProposalId, ProposalParams, ProposalStatus};
use crate::voting::Tally;
use crate::weights::VotingWeights;

pub const CANCEL_OPTION: &str = "Cancel Proposal";
pub const NO_OP_OPTION: &str = "Do Nothing";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceEngine {
    address: Address,
    config: DaoConfig,
    proposals: Vec<Proposal>,
}

impl GovernanceEngine {
    pub fn new(address: Address, config: DaoConfig) -> Result<Self> {
        validate_quorum_fraction(config.min_quorum_fraction)
            .map_err(GovernanceError::InvalidConfig)?;
        Ok(Self {
            address,
            config,
            proposals: Vec::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &DaoConfig {
        &self.config
    }

    pub fn proposals_count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        let index = id.checked_sub(1)?;
        self.proposals.get(usize::try_from(index).ok()?)
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn status(&self, id: ProposalId) -> Result<ProposalStatus> {
        Ok(self.get(id)?.status())
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> Result<bool> {
        Ok(self.get(id)?.has_voted(voter))
    }

    /// Current tally of `id` under the live quorum rule
    pub fn tally(&self, id: ProposalId) -> Result<Tally> {
        Ok(self.get(id)?.tally(self.config.min_quorum_fraction))
    }

    /// Open a new proposal. Only one proposal may be live at a time.
    pub fn propose(
        &mut self,
        ctx: &CallContext,
        weights: &mut dyn VotingWeights,
        params: ProposalParams,
    ) -> Result<ProposalId> {
        self.admit(ctx, weights, params, true)
    }

    /// Open a proposal whose first option cancels `target`.
    ///
    /// Not subject to the single-live-proposal rule, since the proposal it
    /// targets is normally the live one.
    pub fn propose_cancel(
        &mut self,
        ctx: &CallContext,
        weights: &mut dyn VotingWeights,
        target: ProposalId,
        title: String,
        reason: String,
    ) -> Result<ProposalId> {
        let proposal = self.get(target)?;
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(target));
        }
        if proposal.cancelled {
            return Err(GovernanceError::ProposalCancelled(target));
        }

        let cancel = GovernanceCall::Cancel {
            proposal_id: target,
        }
        .into_action(self.address)?;
        let params = ProposalParams {
            title,
            description: reason,
            voting_time: self.config.min_voting_time,
            execution_delay: self.config.min_execution_delay,
            options: vec![CANCEL_OPTION.to_string(), NO_OP_OPTION.to_string()],
            actions_by_option: vec![vec![cancel], Vec::new()],
        };
        self.admit(ctx, weights, params, false)
    }

    fn admit(
        &mut self,
        ctx: &CallContext,
        weights: &mut dyn VotingWeights,
        params: ProposalParams,
        single_live: bool,
    ) -> Result<ProposalId> {
        let available = weights.balance_of(&ctx.caller);
        if available < self.config.min_balance_to_propose {
            return Err(GovernanceError::InsufficientBalance {
                required: self.config.min_balance_to_propose,
                available,
            });
        }
        params.validate(&self.config)?;
        if single_live {
            if let Some(latest) = self.proposals.last().filter(|p| p.is_live()) {
                return Err(GovernanceError::LiveProposalExists(latest.id));
            }
        }

        let snapshot_id = weights.snapshot(&ctx.with_caller(self.address))?;
        let snapshot_total_supply = weights.total_supply();
        let id = self.proposals_count() + 1;
        let proposal = Proposal::new(
            id,
            ctx.caller,
            ctx.now,
            snapshot_id,
            snapshot_total_supply,
            params,
        );
        info!(
            proposal = id,
            proposer = %ctx.caller,
            snapshot_id,
            voting_ends_at = proposal.voting_ends_at,
            executable_at = proposal.executable_at,
            "proposal created: {}",
            proposal.title
        );
        self.proposals.push(proposal);
        Ok(id)
    }

    /// Cast the caller's live weight for `option`. Returns the weight counted.
    pub fn vote(
        &mut self,
        ctx: &CallContext,
        weights: &dyn VotingWeights,
        id: ProposalId,
        option: usize,
    ) -> Result<Amount> {
        let voter = ctx.caller;
        let proposal = self.get_mut(id)?;
        if proposal.has_voted(&voter) {
            return Err(GovernanceError::AlreadyVoted {
                proposal: id,
                voter,
            });
        }
        if !proposal.accepts_votes(ctx.now) {
            return Err(GovernanceError::VotingClosed {
                proposal: id,
                ended_at: proposal.voting_ends_at,
            });
        }
        let tally = proposal
            .votes_by_option
            .get_mut(option)
            .ok_or(GovernanceError::InvalidOption {
                proposal: id,
                option,
            })?;

        let weight = weights.votes(&voter);
        *tally = tally
            .checked_add(weight)
            .ok_or(GovernanceError::Ledger(dao_ledger::LedgerError::Overflow))?;
        proposal.voters.insert(voter);

        info!(proposal = id, %voter, option, %weight, "vote cast");
        Ok(weight)
    }

    /// Perform the winning option's actions.
    ///
    /// Calls to the engine's own address are handled here; everything else
    /// goes through `host` with the engine as caller. On failure the engine is
    /// restored; reverting the host's side is the host's business.
    pub fn execute(
        &mut self,
        ctx: &CallContext,
        host: &mut dyn CallHost,
        id: ProposalId,
    ) -> Result<Tally> {
        let proposal = self.get(id)?;
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        if proposal.cancelled {
            return Err(GovernanceError::ProposalCancelled(id));
        }
        if ctx.now < proposal.executable_at {
            return Err(GovernanceError::NotYetExecutable {
                proposal: id,
                executable_at: proposal.executable_at,
                now: ctx.now,
            });
        }
        let tally = proposal.tally(self.config.min_quorum_fraction);
        if !tally.meets_quorum() {
            return Err(GovernanceError::QuorumNotReached {
                votes: tally.winning_votes,
                required: tally.quorum_required,
            });
        }
        let actions = proposal.actions_by_option[tally.winning_option].clone();

        let checkpoint = self.clone();
        self.get_mut(id)?.executed = true;

        let engine_ctx = ctx.with_caller(self.address);
        for (index, action) in actions.iter().enumerate() {
            let outcome = if action.target == self.address {
                self.self_call(&engine_ctx, action)
            } else {
                host.perform_call(engine_ctx, action)
            };
            if let Err(source) = outcome {
                warn!(proposal = id, index, target = %action.target, "action failed: {}", source);
                *self = checkpoint;
                return Err(GovernanceError::ActionFailed { index, source });
            }
        }

        info!(
            proposal = id,
            option = tally.winning_option,
            votes = %tally.winning_votes,
            actions = actions.len(),
            "proposal executed"
        );
        Ok(tally)
    }

    fn self_call(&mut self, ctx: &CallContext, action: &Action) -> std::result::Result<(), CallError> {
        let call: GovernanceCall = action.decode_payload()?;
        self.handle(ctx, call)
            .map_err(|e| CallError::Reverted(e.to_string()))
    }

    /// Run a decoded call. The caller must be the engine itself.
    pub fn handle(&mut self, ctx: &CallContext, call: GovernanceCall) -> Result<()> {
        match call {
            GovernanceCall::Cancel { proposal_id } => self.cancel(ctx, proposal_id),
            GovernanceCall::SetMinBalanceToPropose { amount } => {
                self.set_min_balance_to_propose(ctx, amount)
            }
            GovernanceCall::SetMinQuorumFraction { fraction } => {
                self.set_min_quorum_fraction(ctx, fraction)
            }
            GovernanceCall::SetMinVotingTime { seconds } => self.set_min_voting_time(ctx, seconds),
            GovernanceCall::SetMinExecutionDelay { seconds } => {
                self.set_min_execution_delay(ctx, seconds)
            }
        }
    }

    pub fn cancel(&mut self, ctx: &CallContext, id: ProposalId) -> Result<()> {
        self.require_self(ctx)?;
        let proposal = self.get_mut(id)?;
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        proposal.cancelled = true;
        info!(proposal = id, "proposal cancelled");
        Ok(())
    }

    pub fn set_min_balance_to_propose(&mut self, ctx: &CallContext, amount: Amount) -> Result<()> {
        self.require_self(ctx)?;
        self.config.min_balance_to_propose = amount;
        info!(%amount, "min balance to propose updated");
        Ok(())
    }

    pub fn set_min_quorum_fraction(&mut self, ctx: &CallContext, fraction: Amount) -> Result<()> {
        self.require_self(ctx)?;
        validate_quorum_fraction(fraction).map_err(GovernanceError::InvalidConfig)?;
        self.config.min_quorum_fraction = fraction;
        info!(%fraction, "min quorum fraction updated");
        Ok(())
    }

    pub fn set_min_voting_time(&mut self, ctx: &CallContext, seconds: Timestamp) -> Result<()> {
        self.require_self(ctx)?;
        self.config.min_voting_time = seconds;
        info!(seconds, "min voting time updated");
        Ok(())
    }

    pub fn set_min_execution_delay(&mut self, ctx: &CallContext, seconds: Timestamp) -> Result<()> {
        self.require_self(ctx)?;
        self.config.min_execution_delay = seconds;
        info!(seconds, "min execution delay updated");
        Ok(())
    }

    fn require_self(&self, ctx: &CallContext) -> Result<()> {
        if ctx.caller != self.address {
            return Err(GovernanceError::NotSelfCall { caller: ctx.caller });
        }
        Ok(())
    }

    fn get(&self, id: ProposalId) -> Result<&Proposal> {
        self.proposal(id).ok_or(GovernanceError::ProposalNotFound(id))
    }

    fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal> {
        let index = id
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        self.proposals
            .get_mut(index)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }
}
