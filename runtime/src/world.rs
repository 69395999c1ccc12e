//! Transactional host
//!
//! Every entry point runs as one transaction: it gets a fresh transaction id,
//! sees the current clock, and either commits everything it did or, on any
//! error, leaves the world exactly as it found it.

use tracing::{info, warn};

use dao_core::{
    Action, Address, Amount, Asset, CallContext, CallHost, MemoryPool, MemoryToken, SnapshotId,
    Timestamp, TxId,
};
use dao_ledger::{Role, WeightLedger};
use governance::{GovernanceCall, GovernanceEngine, ProposalId, ProposalParams, Tally};

use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::host::Host;
use crate::native::NativeBank;

#[derive(Debug, Clone)]
pub struct World {
    now: Timestamp,
    last_tx: TxId,
    native: NativeBank,
    base: MemoryToken,
    pool: MemoryPool,
    ledger: WeightLedger,
    engine: GovernanceEngine,
}

impl World {
    /// Build a world from its configuration. The engine is given the
    /// snapshot role so proposals can pin their supply.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        config.validate()?;
        let addresses = &config.addresses;

        let mut world = Self {
            now: config.start_time,
            last_tx: 0,
            native: NativeBank::new(),
            base: MemoryToken::new(addresses.base_token),
            pool: MemoryPool::new(addresses.pool_token),
            ledger: WeightLedger::new(addresses.ledger, config.admin),
            engine: GovernanceEngine::new(addresses.engine, config.dao.clone())?,
        };
        world.pool.set_base_reserve(config.pool.base_reserve);
        for allocation in &config.genesis {
            world.base.mint(&allocation.account, allocation.tokens)?;
            world.pool.mint(&allocation.account, allocation.liquidity)?;
            world.native.credit(&allocation.account, allocation.native)?;
        }

        let engine = addresses.engine;
        world.transact(config.admin, |w, ctx| {
            w.ledger.grant_role(&ctx, Role::Snapshotter, engine)?;
            Ok(())
        })?;

        info!(
            ledger = %addresses.ledger,
            engine = %addresses.engine,
            accounts = config.genesis.len(),
            "world created"
        );
        Ok(world)
    }

    /// Run `f` as one transaction by `caller`
    pub fn transact<T>(
        &mut self,
        caller: Address,
        f: impl FnOnce(&mut World, CallContext) -> Result<T>,
    ) -> Result<T> {
        self.last_tx += 1;
        let ctx = CallContext::new(caller, self.last_tx, self.now);
        let checkpoint = self.clone();
        match f(self, ctx) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(tx = ctx.tx, %caller, "transaction rolled back: {}", e);
                *self = checkpoint;
                Err(e)
            }
        }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn advance(&mut self, seconds: Timestamp) {
        self.now = self.now.saturating_add(seconds);
    }

    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<()> {
        self.base.mint(&to, amount)?;
        Ok(())
    }

    pub fn mint_liquidity(&mut self, to: Address, units: Amount) -> Result<()> {
        self.pool.mint(&to, units)?;
        Ok(())
    }

    pub fn credit_native(&mut self, to: Address, amount: Amount) -> Result<()> {
        self.native.credit(&to, amount)?;
        Ok(())
    }

    pub fn set_pool_reserve(&mut self, reserve: Amount) {
        self.pool.set_base_reserve(reserve);
    }

    pub fn lock(&mut self, caller: Address, amount: Amount) -> Result<()> {
        self.transact(caller, |w, ctx| Ok(w.ledger.lock(&ctx, &mut w.base, amount)?))
    }

    pub fn unlock(&mut self, caller: Address, amount: Amount) -> Result<()> {
        self.transact(caller, |w, ctx| Ok(w.ledger.unlock(&ctx, &mut w.base, amount)?))
    }

    pub fn lock_liquidity(&mut self, caller: Address, units: Amount) -> Result<()> {
        self.transact(caller, |w, ctx| {
            Ok(w.ledger.lock_liquidity(&ctx, &mut w.pool, units)?)
        })
    }

    pub fn unlock_liquidity(&mut self, caller: Address, units: Amount) -> Result<()> {
        self.transact(caller, |w, ctx| {
            Ok(w.ledger.unlock_liquidity(&ctx, &mut w.pool, units)?)
        })
    }

    pub fn delegate(&mut self, caller: Address, to: Address) -> Result<()> {
        self.transact(caller, |w, ctx| Ok(w.ledger.delegate(&ctx, to)?))
    }

    pub fn donate(&mut self, caller: Address, amount: Amount) -> Result<()> {
        self.transact(caller, |w, ctx| Ok(w.ledger.donate(&ctx, &mut w.base, amount)?))
    }

    pub fn grant_weight(
        &mut self,
        caller: Address,
        accounts: &[Address],
        principal_equivalents: &[Amount],
        weights: &[Amount],
    ) -> Result<()> {
        self.transact(caller, |w, ctx| {
            Ok(w.ledger
                .grant_weight(&ctx, accounts, principal_equivalents, weights)?)
        })
    }

    pub fn snapshot(&mut self, caller: Address) -> Result<SnapshotId> {
        self.transact(caller, |w, ctx| Ok(w.ledger.snapshot(&ctx)?))
    }

    pub fn propose(&mut self, caller: Address, params: ProposalParams) -> Result<ProposalId> {
        self.transact(caller, |w, ctx| {
            Ok(w.engine.propose(&ctx, &mut w.ledger, params)?)
        })
    }

    pub fn propose_cancel(
        &mut self,
        caller: Address,
        target: ProposalId,
        title: String,
        reason: String,
    ) -> Result<ProposalId> {
        self.transact(caller, |w, ctx| {
            Ok(w.engine
                .propose_cancel(&ctx, &mut w.ledger, target, title, reason)?)
        })
    }

    pub fn vote(&mut self, caller: Address, id: ProposalId, option: usize) -> Result<Amount> {
        self.transact(caller, |w, ctx| Ok(w.engine.vote(&ctx, &w.ledger, id, option)?))
    }

    pub fn execute(&mut self, caller: Address, id: ProposalId) -> Result<Tally> {
        self.transact(caller, |w, ctx| {
            let (engine, mut host) = w.split();
            Ok(engine.execute(&ctx, &mut host, id)?)
        })
    }

    /// Perform one action as `caller`
    pub fn call(&mut self, caller: Address, action: &Action) -> Result<()> {
        self.transact(caller, |w, ctx| w.dispatch(ctx, action))
    }

    /// Perform several actions as `caller` inside a single transaction
    pub fn batch(&mut self, caller: Address, actions: &[Action]) -> Result<()> {
        self.transact(caller, |w, ctx| {
            actions.iter().try_for_each(|action| w.dispatch(ctx, action))
        })
    }

    fn dispatch(&mut self, ctx: CallContext, action: &Action) -> Result<()> {
        let engine_address = self.engine.address();
        if action.target == engine_address && !action.payload.is_empty() {
            let call: GovernanceCall = action.decode_payload()?;
            self.native
                .transfer(&ctx.caller, &engine_address, action.value)?;
            self.engine.handle(&ctx, call)?;
            return Ok(());
        }
        let (_, mut host) = self.split();
        host.perform_call(ctx, action)?;
        Ok(())
    }

    fn split(&mut self) -> (&mut GovernanceEngine, Host<'_>) {
        let World {
            native,
            base,
            pool,
            ledger,
            engine,
            ..
        } = self;
        (
            engine,
            Host {
                native,
                base,
                pool,
                ledger,
            },
        )
    }

    pub fn ledger(&self) -> &WeightLedger {
        &self.ledger
    }

    pub fn engine(&self) -> &GovernanceEngine {
        &self.engine
    }

    pub fn base(&self) -> &MemoryToken {
        &self.base
    }

    pub fn pool(&self) -> &MemoryPool {
        &self.pool
    }

    pub fn native_balance(&self, account: &Address) -> Amount {
        self.native.balance_of(account)
    }

    pub fn token_balance(&self, account: &Address) -> Amount {
        self.base.balance_of(account)
    }

    pub fn last_tx(&self) -> TxId {
        self.last_tx
    }
}
