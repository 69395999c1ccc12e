//! End-to-end scenarios against a full world

use dao_core::{units, Action, Address, Amount, PRECISION};
use dao_ledger::{LedgerCall, LedgerError, Role};
use dao_runtime::{Addresses, Allocation, PoolConfig, RuntimeConfig, RuntimeError, TokenCall, World};
use governance::{
    DaoConfig, GovernanceCall, GovernanceError, ProposalParams, ProposalStatus,
};

const ADMIN: u64 = 1;
const ALICE: u64 = 2;
const BOB: u64 = 3;
const CAROL: u64 = 4;

fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

fn ledger() -> Address {
    addr(50)
}

fn engine() -> Address {
    addr(60)
}

fn token() -> Address {
    addr(100)
}

fn allocation(n: u64, tokens: Amount) -> Allocation {
    Allocation {
        account: addr(n),
        tokens,
        liquidity: units(100),
        native: units(20),
    }
}

fn config(min_quorum_fraction: Amount) -> RuntimeConfig {
    RuntimeConfig {
        admin: addr(ADMIN),
        start_time: 1_000,
        addresses: Addresses {
            ledger: ledger(),
            engine: engine(),
            base_token: token(),
            pool_token: addr(200),
        },
        dao: DaoConfig {
            min_balance_to_propose: 1,
            min_quorum_fraction,
            min_voting_time: 100,
            min_execution_delay: 10,
        },
        pool: PoolConfig {
            base_reserve: units(1_000),
        },
        genesis: vec![
            allocation(ALICE, units(1_000)),
            allocation(BOB, units(1_000)),
            allocation(CAROL, units(1_000)),
        ],
    }
}

/// Alice holds 500 locked tokens
fn world() -> World {
    let mut world = World::from_config(&config(10)).unwrap();
    world.lock(addr(ALICE), units(500)).unwrap();
    world
}

fn params(actions: Vec<Action>) -> ProposalParams {
    ProposalParams {
        title: "Title".to_string(),
        description: "Description".to_string(),
        voting_time: 1000,
        execution_delay: 100,
        options: vec!["For".to_string(), "Against".to_string()],
        actions_by_option: vec![actions, Vec::new()],
    }
}

fn governance_err(result: Result<impl std::fmt::Debug, RuntimeError>) -> GovernanceError {
    match result {
        Err(RuntimeError::Governance(e)) => e,
        other => panic!("expected governance error, got {:?}", other),
    }
}

#[test]
fn test_end_to_end() {
    let mut world = world();
    let id = world.propose(addr(ALICE), params(Vec::new())).unwrap();
    assert_eq!(id, 1);
    assert_eq!(world.vote(addr(ALICE), id, 0).unwrap(), units(500));

    world.advance(1_100);
    world.execute(addr(BOB), id).unwrap();
    assert_eq!(world.engine().status(id).unwrap(), ProposalStatus::Executed);
    assert_eq!(
        governance_err(world.execute(addr(BOB), id)),
        GovernanceError::AlreadyExecuted(1)
    );
}

#[test]
fn test_snapshot_taken_at_proposal() {
    let mut world = world();
    world.propose(addr(ALICE), params(Vec::new())).unwrap();
    world.lock(addr(BOB), units(1)).unwrap();

    let proposal = world.engine().proposal(1).unwrap();
    assert_eq!(proposal.snapshot_id, 1);
    assert_eq!(world.ledger().total_supply_at(1).unwrap(), units(500));
    assert_eq!(world.ledger().total_supply(), units(501));
}

#[test]
fn test_cancellation() {
    let mut world = world();
    world.propose(addr(ALICE), params(Vec::new())).unwrap();

    world.advance(90_000);
    let cancel = world
        .propose_cancel(addr(ALICE), 1, "Cancel 1".to_string(), "Because".to_string())
        .unwrap();
    assert_eq!(cancel, 2);
    world.vote(addr(ALICE), cancel, 0).unwrap();

    world.advance(100_000);
    world.execute(addr(ALICE), cancel).unwrap();
    assert!(world.engine().proposal(1).unwrap().cancelled);
    assert_eq!(
        governance_err(world.execute(addr(ALICE), 1)),
        GovernanceError::ProposalCancelled(1)
    );
}

#[test]
fn test_execute_pays_value_and_amends_rules() {
    let mut world = world();
    world
        .call(addr(ALICE), &Action::transfer(engine(), units(10)))
        .unwrap();
    assert_eq!(world.native_balance(&engine()), units(10));

    let payout = Action::transfer(addr(ALICE), units(1));
    let raise = GovernanceCall::SetMinBalanceToPropose { amount: units(99) }
        .into_action(engine())
        .unwrap();
    world
        .propose(addr(ALICE), params(vec![payout, raise]))
        .unwrap();
    world.vote(addr(ALICE), 1, 0).unwrap();
    world.advance(90_000);

    let before = world.native_balance(&addr(ALICE));
    world.execute(addr(ALICE), 1).unwrap();
    assert_eq!(world.native_balance(&engine()), units(9));
    assert_eq!(world.native_balance(&addr(ALICE)), before + units(1));
    assert_eq!(world.engine().config().min_balance_to_propose, units(99));

    assert_eq!(
        governance_err(world.execute(addr(ALICE), 1)),
        GovernanceError::AlreadyExecuted(1)
    );
    world.propose(addr(ALICE), params(Vec::new())).unwrap();
    assert!(matches!(
        governance_err(world.execute(addr(ALICE), 2)),
        GovernanceError::NotYetExecutable { proposal: 2, .. }
    ));
    assert_eq!(
        governance_err(world.execute(addr(ALICE), 3)),
        GovernanceError::ProposalNotFound(3)
    );
    world.advance(90_000);
    assert!(matches!(
        governance_err(world.execute(addr(ALICE), 2)),
        GovernanceError::QuorumNotReached { votes: 0, .. }
    ));
}

#[test]
fn test_direct_setter_call_rejected() {
    let mut world = world();
    let action = GovernanceCall::SetMinBalanceToPropose { amount: 0 }
        .into_action(engine())
        .unwrap();
    assert_eq!(
        governance_err(world.call(addr(ALICE), &action)),
        GovernanceError::NotSelfCall { caller: addr(ALICE) }
    );
    assert_eq!(world.engine().config().min_balance_to_propose, 1);
}

#[test]
fn test_quorum_boundary() {
    // 10% of 1000 supply
    let fraction = PRECISION / 10;
    for (bob_lock, passes) in [(units(100), true), (units(100) - 1, false)] {
        let mut world = World::from_config(&config(fraction)).unwrap();
        world.lock(addr(ALICE), units(1_000) - bob_lock).unwrap();
        world.lock(addr(BOB), bob_lock).unwrap();
        assert_eq!(world.ledger().total_supply(), units(1_000));

        world.propose(addr(ALICE), params(Vec::new())).unwrap();
        world.vote(addr(BOB), 1, 0).unwrap();
        world.advance(1_100);

        let result = world.execute(addr(BOB), 1);
        if passes {
            assert_eq!(result.unwrap().quorum_required, units(100));
        } else {
            assert_eq!(
                governance_err(result),
                GovernanceError::QuorumNotReached {
                    votes: units(100) - 1,
                    required: units(100),
                }
            );
        }
    }
}

#[test]
fn test_single_live_proposal() {
    let mut world = world();
    world.propose(addr(ALICE), params(Vec::new())).unwrap();
    world.advance(1_000_000);
    assert_eq!(
        governance_err(world.propose(addr(ALICE), params(Vec::new()))),
        GovernanceError::LiveProposalExists(1)
    );
    assert_eq!(world.engine().proposals_count(), 1);
    // the failed attempt did not mint a snapshot
    assert_eq!(world.ledger().current_snapshot_id(), 1);
}

#[test]
fn test_lock_then_unlock_in_one_transaction() {
    let mut world = world();
    let lock = LedgerCall::Lock { amount: units(5) }
        .into_action(ledger())
        .unwrap();
    let unlock = LedgerCall::Unlock { amount: units(5) }
        .into_action(ledger())
        .unwrap();

    let result = world.batch(addr(BOB), &[lock.clone(), unlock.clone()]);
    assert!(matches!(result, Err(RuntimeError::Call(_))));
    // the lock in the same batch was rolled back too
    assert_eq!(world.ledger().balance_of(&addr(BOB)), 0);
    assert_eq!(world.token_balance(&addr(BOB)), units(1_000));

    // separate transactions are fine
    world.call(addr(BOB), &lock).unwrap();
    world.call(addr(BOB), &unlock).unwrap();
    assert_eq!(world.token_balance(&addr(BOB)), units(1_000));
}

#[test]
fn test_liquidity_lock_guarded_against_base_unlock() {
    let mut world = world();
    let unlock = LedgerCall::Unlock { amount: units(1) }
        .into_action(ledger())
        .unwrap();
    let lock_liquidity = LedgerCall::LockLiquidity { units: units(10) }
        .into_action(ledger())
        .unwrap();
    assert!(world
        .batch(addr(ALICE), &[unlock.clone(), lock_liquidity.clone()])
        .is_err());
    assert_eq!(world.ledger().balance_of(&addr(ALICE)), units(500));

    world.lock_liquidity(addr(ALICE), units(10)).unwrap();
    // 10 of 300 pool units against a 1000 reserve
    assert_eq!(
        world.ledger().balance_of(&addr(ALICE)),
        units(500) + 33_333_333_333_333_333_333
    );
}

#[test]
fn test_proposal_grants_weight_through_ledger() {
    let mut world = world();
    let grant_role = LedgerCall::GrantRole {
        role: Role::WeightGranter,
        account: engine(),
    }
    .into_action(ledger())
    .unwrap();
    world.call(addr(ADMIN), &grant_role).unwrap();

    let grant = LedgerCall::GrantWeight {
        accounts: vec![addr(CAROL)],
        principal_equivalents: vec![units(1)],
        weights: vec![units(20)],
    }
    .into_action(ledger())
    .unwrap();
    world.propose(addr(ALICE), params(vec![grant])).unwrap();
    world.vote(addr(ALICE), 1, 0).unwrap();
    world.advance(1_100);
    world.execute(addr(ALICE), 1).unwrap();

    assert_eq!(world.ledger().balance_of(&addr(CAROL)), units(20));
    assert_eq!(world.ledger().total_supply(), units(520));
    assert_eq!(world.ledger().granted_accounts(0, 10), vec![addr(CAROL)]);
}

#[test]
fn test_grant_weight_requires_role() {
    let mut world = world();
    let result = world.grant_weight(addr(BOB), &[addr(CAROL)], &[0], &[units(1)]);
    assert!(matches!(
        result,
        Err(RuntimeError::Ledger(LedgerError::Unauthorized { .. }))
    ));
}

#[test]
fn test_failed_action_rolls_back_every_effect() {
    let mut world = world();
    world.mint(engine(), units(50)).unwrap();
    let spend = TokenCall::Transfer {
        to: addr(CAROL),
        amount: units(50),
    }
    .into_action(token())
    .unwrap();
    let stray = Action {
        target: addr(77),
        value: 0,
        payload: vec![1, 2, 3],
    };
    world.propose(addr(ALICE), params(vec![spend, stray])).unwrap();
    world.vote(addr(ALICE), 1, 0).unwrap();
    world.advance(1_100);

    assert!(matches!(
        governance_err(world.execute(addr(ALICE), 1)),
        GovernanceError::ActionFailed { index: 1, .. }
    ));
    assert_eq!(world.token_balance(&engine()), units(50));
    assert_eq!(world.token_balance(&addr(CAROL)), units(1_000));
    assert!(world.engine().proposal(1).unwrap().is_live());
}

#[test]
fn test_donation_accrues_to_lockers() {
    let mut world = world();
    world.lock(addr(BOB), units(500)).unwrap();
    world.donate(addr(CAROL), units(100)).unwrap();

    assert_eq!(world.ledger().pending_fees(&addr(ALICE)).unwrap(), units(50));
    // realized on the next action
    world.delegate(addr(ALICE), addr(ALICE)).unwrap();
    assert_eq!(world.ledger().balance_of(&addr(ALICE)), units(550));
    assert_eq!(world.ledger().pending_fees(&addr(ALICE)).unwrap(), 0);
}

#[test]
fn test_report_serializes() {
    let mut world = world();
    world.propose(addr(ALICE), params(Vec::new())).unwrap();
    let report = world.report(&[addr(ALICE), addr(BOB)]);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["total_supply"], "500000000000000000000");
    assert_eq!(json["accounts"][0]["balance"], "500000000000000000000");
    assert_eq!(json["proposals"][0]["status"], "Active");
}

#[test]
fn test_transfer_and_call_locks_for_sender() {
    let mut world = world();
    let id = world.snapshot(addr(ADMIN)).unwrap();
    let send = TokenCall::TransferAndCall {
        to: ledger(),
        amount: units(200),
    }
    .into_action(token())
    .unwrap();
    world.call(addr(ALICE), &send).unwrap();

    assert_eq!(world.ledger().account(&addr(ALICE)).locked_principal, units(700));
    assert_eq!(world.ledger().total_supply(), units(700));
    assert_eq!(world.ledger().total_supply_at(id).unwrap(), units(500));
    assert_eq!(world.token_balance(&addr(ALICE)), units(300));

    // rejected transfers leave both sides untouched
    let too_much = TokenCall::TransferAndCall {
        to: ledger(),
        amount: units(301),
    }
    .into_action(token())
    .unwrap();
    assert!(world.call(addr(ALICE), &too_much).is_err());
    assert_eq!(world.token_balance(&addr(ALICE)), units(300));
    assert_eq!(world.ledger().total_supply(), units(700));
}
