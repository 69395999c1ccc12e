//! Scenario steps and their replay against a world

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use dao_core::{Action, Address, Amount, Asset, CallError, Timestamp};
use dao_ledger::LedgerCall;
use dao_runtime::{RuntimeError, TokenCall, World};
use governance::{GovernanceCall, ProposalId, ProposalParams};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub op: Op,

    /// The step is expected to be rejected
    #[serde(default)]
    pub expect_failure: bool,
}

/// Action as written in a scenario; addresses of known components are
/// filled in from the world
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioAction {
    Transfer {
        target: Address,
        #[serde(with = "dao_core::serde_amount")]
        value: Amount,
    },
    Ledger {
        call: LedgerCall,
    },
    Governance {
        call: GovernanceCall,
    },
    Token {
        call: TokenCall,
    },
    Raw {
        action: Action,
    },
}

impl ScenarioAction {
    pub fn resolve(&self, world: &World) -> Result<Action, CallError> {
        match self {
            ScenarioAction::Transfer { target, value } => Ok(Action::transfer(*target, *value)),
            ScenarioAction::Ledger { call } => call.clone().into_action(world.ledger().address()),
            ScenarioAction::Governance { call } => call.clone().into_action(world.engine().address()),
            ScenarioAction::Token { call } => call.clone().into_action(world.base().address()),
            ScenarioAction::Raw { action } => Ok(action.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Advance {
        seconds: Timestamp,
    },
    Mint {
        to: Address,
        #[serde(with = "dao_core::serde_amount")]
        amount: Amount,
    },
    Lock {
        from: Address,
        #[serde(with = "dao_core::serde_amount")]
        amount: Amount,
    },
    Unlock {
        from: Address,
        #[serde(with = "dao_core::serde_amount")]
        amount: Amount,
    },
    LockLiquidity {
        from: Address,
        #[serde(with = "dao_core::serde_amount")]
        units: Amount,
    },
    UnlockLiquidity {
        from: Address,
        #[serde(with = "dao_core::serde_amount")]
        units: Amount,
    },
    Delegate {
        from: Address,
        to: Address,
    },
    Donate {
        from: Address,
        #[serde(with = "dao_core::serde_amount")]
        amount: Amount,
    },
    GrantWeight {
        from: Address,
        accounts: Vec<Address>,
        #[serde(with = "dao_core::serde_amount::vec")]
        principal_equivalents: Vec<Amount>,
        #[serde(with = "dao_core::serde_amount::vec")]
        weights: Vec<Amount>,
    },
    Snapshot {
        from: Address,
    },
    Propose {
        from: Address,
        title: String,
        #[serde(default)]
        description: String,
        voting_time: Timestamp,
        execution_delay: Timestamp,
        options: Vec<String>,
        actions_by_option: Vec<Vec<ScenarioAction>>,
    },
    ProposeCancel {
        from: Address,
        proposal: ProposalId,
        title: String,
        #[serde(default)]
        reason: String,
    },
    Vote {
        from: Address,
        proposal: ProposalId,
        option: usize,
    },
    Execute {
        from: Address,
        proposal: ProposalId,
    },
    Call {
        from: Address,
        actions: Vec<ScenarioAction>,
    },
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Advance { .. } => "advance",
            Op::Mint { .. } => "mint",
            Op::Lock { .. } => "lock",
            Op::Unlock { .. } => "unlock",
            Op::LockLiquidity { .. } => "lock_liquidity",
            Op::UnlockLiquidity { .. } => "unlock_liquidity",
            Op::Delegate { .. } => "delegate",
            Op::Donate { .. } => "donate",
            Op::GrantWeight { .. } => "grant_weight",
            Op::Snapshot { .. } => "snapshot",
            Op::Propose { .. } => "propose",
            Op::ProposeCancel { .. } => "propose_cancel",
            Op::Vote { .. } => "vote",
            Op::Execute { .. } => "execute",
            Op::Call { .. } => "call",
        }
    }

    /// Every address the step mentions
    pub fn accounts(&self, into: &mut BTreeSet<Address>) {
        match self {
            Op::Advance { .. } => {}
            Op::Mint { to, .. } => {
                into.insert(*to);
            }
            Op::Delegate { from, to } => {
                into.insert(*from);
                into.insert(*to);
            }
            Op::GrantWeight { from, accounts, .. } => {
                into.insert(*from);
                into.extend(accounts.iter().copied());
            }
            Op::Lock { from, .. }
            | Op::Unlock { from, .. }
            | Op::LockLiquidity { from, .. }
            | Op::UnlockLiquidity { from, .. }
            | Op::Donate { from, .. }
            | Op::Snapshot { from }
            | Op::Propose { from, .. }
            | Op::ProposeCancel { from, .. }
            | Op::Vote { from, .. }
            | Op::Execute { from, .. }
            | Op::Call { from, .. } => {
                into.insert(*from);
            }
        }
    }

    /// Run the step, returning a one-line description of its result
    pub fn apply(&self, world: &mut World) -> Result<String, RuntimeError> {
        match self {
            Op::Advance { seconds } => {
                world.advance(*seconds);
                Ok(format!("now {}", world.now()))
            }
            Op::Mint { to, amount } => {
                world.mint(*to, *amount)?;
                Ok(format!("minted {} to {}", amount, to))
            }
            Op::Lock { from, amount } => {
                world.lock(*from, *amount)?;
                Ok(format!("balance {}", world.ledger().balance_of(from)))
            }
            Op::Unlock { from, amount } => {
                world.unlock(*from, *amount)?;
                Ok(format!("balance {}", world.ledger().balance_of(from)))
            }
            Op::LockLiquidity { from, units } => {
                world.lock_liquidity(*from, *units)?;
                Ok(format!("balance {}", world.ledger().balance_of(from)))
            }
            Op::UnlockLiquidity { from, units } => {
                world.unlock_liquidity(*from, *units)?;
                Ok(format!("balance {}", world.ledger().balance_of(from)))
            }
            Op::Delegate { from, to } => {
                world.delegate(*from, *to)?;
                Ok(format!("votes of {}: {}", to, world.ledger().votes(to)))
            }
            Op::Donate { from, amount } => {
                world.donate(*from, *amount)?;
                Ok(format!("fee growth {}", world.ledger().fee_growth()))
            }
            Op::GrantWeight {
                from,
                accounts,
                principal_equivalents,
                weights,
            } => {
                world.grant_weight(*from, accounts, principal_equivalents, weights)?;
                Ok(format!("total supply {}", world.ledger().total_supply()))
            }
            Op::Snapshot { from } => {
                let id = world.snapshot(*from)?;
                Ok(format!("snapshot {}", id))
            }
            Op::Propose {
                from,
                title,
                description,
                voting_time,
                execution_delay,
                options,
                actions_by_option,
            } => {
                let actions_by_option = actions_by_option
                    .iter()
                    .map(|actions| {
                        actions
                            .iter()
                            .map(|action| action.resolve(world))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let params = ProposalParams {
                    title: title.clone(),
                    description: description.clone(),
                    voting_time: *voting_time,
                    execution_delay: *execution_delay,
                    options: options.clone(),
                    actions_by_option,
                };
                let id = world.propose(*from, params)?;
                Ok(format!("proposal {}", id))
            }
            Op::ProposeCancel {
                from,
                proposal,
                title,
                reason,
            } => {
                let id = world.propose_cancel(*from, *proposal, title.clone(), reason.clone())?;
                Ok(format!("proposal {} cancels {}", id, proposal))
            }
            Op::Vote {
                from,
                proposal,
                option,
            } => {
                let weight = world.vote(*from, *proposal, *option)?;
                Ok(format!("{} for option {}", weight, option))
            }
            Op::Execute { from, proposal } => {
                let tally = world.execute(*from, *proposal)?;
                Ok(format!(
                    "option {} won with {} (quorum {})",
                    tally.winning_option, tally.winning_votes, tally.quorum_required
                ))
            }
            Op::Call { from, actions } => {
                let actions = actions
                    .iter()
                    .map(|action| action.resolve(world))
                    .collect::<Result<Vec<_>, _>>()?;
                world.batch(*from, &actions)?;
                Ok(format!("{} actions", actions.len()))
            }
        }
    }
}

/// Result of one replayed step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    pub success: bool,
    pub expect_failure: bool,
    pub detail: String,
}

impl StepOutcome {
    /// Did the step behave as the scenario said it would
    pub fn as_expected(&self) -> bool {
        self.success != self.expect_failure
    }
}
