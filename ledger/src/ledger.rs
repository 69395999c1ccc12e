//! Weight ledger
//!
//! Tracks locked balances from three weight sources, single-hop delegation,
//! incrementally maintained total supply, pull-based fee growth and the
//! snapshot history behind every `*_at` query.
//!
//! Every state-changing entry point follows the same shape: realize the
//! caller's pending fees, validate and compute the new record, move assets,
//! then commit. Nothing is written until every fallible step has passed.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use dao_core::{
    mul_div, Address, Amount, Asset, CallContext, LiquidityPool, SnapshotId, TxId, PRECISION,
};

use crate::account::AccountInfo;
use crate::error::{LedgerError, Result};
use crate::roles::{Role, Roles};
use crate::snapshot::SnapshotStore;

/// Quantities with snapshot history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Tracked {
    Balance(Address),
    Votes(Address),
    TotalSupply,
}

/// Validated change to one account, ready to apply
struct Commit {
    account: Address,
    updated: AccountInfo,
    old_balance: Amount,
    new_balance: Amount,
    new_total: Amount,
    delegate: Address,
    new_delegated: Option<Amount>,
}

#[derive(Debug, Clone)]
pub struct WeightLedger {
    address: Address,
    accounts: HashMap<Address, AccountInfo>,
    /// Weight credited to an address by accounts delegating to it
    delegated_votes: HashMap<Address, Amount>,
    total_supply: Amount,
    fee_growth: Amount,
    unattributed_donations: Amount,
    snapshot_id: SnapshotId,
    history: SnapshotStore<Tracked>,
    roles: Roles,
    granted_accounts: Vec<Address>,
    granted_seen: HashSet<Address>,
    last_lock_tx: HashMap<Address, TxId>,
    last_unlock_tx: HashMap<Address, TxId>,
}

impl WeightLedger {
    /// New ledger holding assets at `address`, with `admin` holding every role
    pub fn new(address: Address, admin: Address) -> Self {
        Self {
            address,
            accounts: HashMap::new(),
            delegated_votes: HashMap::new(),
            total_supply: 0,
            fee_growth: 0,
            unattributed_donations: 0,
            snapshot_id: 0,
            history: SnapshotStore::new(),
            roles: Roles::with_admin(admin),
            granted_accounts: Vec::new(),
            granted_seen: HashSet::new(),
            last_lock_tx: HashMap::new(),
            last_unlock_tx: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn account(&self, account: &Address) -> AccountInfo {
        self.accounts.get(account).cloned().unwrap_or_default()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.accounts.get(account).map_or(0, AccountInfo::balance)
    }

    /// Own balance unless delegated away, plus weight delegated in
    pub fn votes(&self, account: &Address) -> Amount {
        let info = self.accounts.get(account);
        let own = match info {
            Some(info) if info.effective_delegate(account) == *account => info.balance(),
            _ => 0,
        };
        own + self.delegated_votes.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn fee_growth(&self) -> Amount {
        self.fee_growth
    }

    /// Donations received while total supply was zero
    pub fn unattributed_donations(&self) -> Amount {
        self.unattributed_donations
    }

    /// Id of the most recent snapshot (0 before the first one)
    pub fn current_snapshot_id(&self) -> SnapshotId {
        self.snapshot_id
    }

    pub fn balance_of_at(&self, account: &Address, snapshot_id: SnapshotId) -> Result<Amount> {
        self.value_at(Tracked::Balance(*account), snapshot_id)
    }

    pub fn votes_at(&self, account: &Address, snapshot_id: SnapshotId) -> Result<Amount> {
        self.value_at(Tracked::Votes(*account), snapshot_id)
    }

    pub fn total_supply_at(&self, snapshot_id: SnapshotId) -> Result<Amount> {
        self.value_at(Tracked::TotalSupply, snapshot_id)
    }

    /// Fee growth owed to `account` that its next action would realize
    pub fn pending_fees(&self, account: &Address) -> Result<Amount> {
        let info = self.account(account);
        self.owed(&info)
    }

    /// Page through every account that ever received a weight grant
    pub fn granted_accounts(&self, offset: usize, count: usize) -> Vec<Address> {
        self.granted_accounts
            .iter()
            .skip(offset)
            .take(count)
            .copied()
            .collect()
    }

    pub fn granted_accounts_len(&self) -> usize {
        self.granted_accounts.len()
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn grant_role(&mut self, ctx: &CallContext, role: Role, account: Address) -> Result<()> {
        self.roles.require(Role::Admin, &ctx.caller)?;
        if self.roles.insert(role, account) {
            info!("granted {:?} to {}", role, account);
        }
        Ok(())
    }

    pub fn revoke_role(&mut self, ctx: &CallContext, role: Role, account: Address) -> Result<()> {
        self.roles.require(Role::Admin, &ctx.caller)?;
        if self.roles.remove(role, &account) {
            info!("revoked {:?} from {}", role, account);
        }
        Ok(())
    }

    /// Close the current period and return its snapshot id
    pub fn snapshot(&mut self, ctx: &CallContext) -> Result<SnapshotId> {
        self.roles.require(Role::Snapshotter, &ctx.caller)?;
        self.snapshot_id += 1;
        info!(snapshot_id = self.snapshot_id, total_supply = %self.total_supply, "snapshot taken");
        Ok(self.snapshot_id)
    }

    /// Pull `amount` of the base asset from the caller and lock it
    pub fn lock(&mut self, ctx: &CallContext, base: &mut dyn Asset, amount: Amount) -> Result<()> {
        let account = ctx.caller;
        let commit = self.stage_lock(account, ctx.tx, amount)?;

        base.transfer(&account, &self.address, amount)?;
        self.apply(commit);
        self.last_lock_tx.insert(account, ctx.tx);

        debug!(%account, %amount, "locked");
        Ok(())
    }

    /// Lock `amount` for `from` after the base asset has already moved it here.
    ///
    /// Called by the base token itself, so `ctx.caller` must be its address.
    pub fn on_token_transfer(
        &mut self,
        ctx: &CallContext,
        base: &dyn Asset,
        from: Address,
        amount: Amount,
    ) -> Result<()> {
        if ctx.caller != base.address() {
            return Err(LedgerError::UnexpectedToken(ctx.caller));
        }
        let commit = self.stage_lock(from, ctx.tx, amount)?;
        self.apply(commit);
        self.last_lock_tx.insert(from, ctx.tx);

        debug!(account = %from, %amount, "locked on transfer");
        Ok(())
    }

    /// Release `amount` of locked principal back to the caller
    pub fn unlock(&mut self, ctx: &CallContext, base: &mut dyn Asset, amount: Amount) -> Result<()> {
        let account = ctx.caller;
        self.guard_unlock(&account, ctx.tx)?;

        let mut info = self.realized(&account)?;
        if amount > info.locked_principal {
            return Err(LedgerError::InsufficientLocked {
                requested: amount,
                available: info.locked_principal,
            });
        }
        info.locked_principal -= amount;
        let commit = self.prepare(account, info)?;

        base.transfer(&self.address, &account, amount)?;
        self.apply(commit);
        self.last_unlock_tx.insert(account, ctx.tx);

        debug!(%account, %amount, "unlocked");
        Ok(())
    }

    /// Lock liquidity-position units and reprice their weight at the spot ratio
    pub fn lock_liquidity(
        &mut self,
        ctx: &CallContext,
        pool: &mut dyn LiquidityPool,
        units: Amount,
    ) -> Result<()> {
        let account = ctx.caller;
        self.guard_lock(&account, ctx.tx)?;

        let mut info = self.realized(&account)?;
        info.liquidity_locked_units = info
            .liquidity_locked_units
            .checked_add(units)
            .ok_or(LedgerError::Overflow)?;
        info.liquidity_locked_weight = liquidity_weight(&*pool, info.liquidity_locked_units)?;
        let commit = self.prepare(account, info)?;

        pool.transfer(&account, &self.address, units)?;
        self.apply(commit);
        self.last_lock_tx.insert(account, ctx.tx);

        debug!(%account, %units, "locked liquidity");
        Ok(())
    }

    pub fn unlock_liquidity(
        &mut self,
        ctx: &CallContext,
        pool: &mut dyn LiquidityPool,
        units: Amount,
    ) -> Result<()> {
        let account = ctx.caller;
        self.guard_unlock(&account, ctx.tx)?;

        let mut info = self.realized(&account)?;
        if units > info.liquidity_locked_units {
            return Err(LedgerError::InsufficientLiquidityLocked {
                requested: units,
                available: info.liquidity_locked_units,
            });
        }
        info.liquidity_locked_units -= units;
        info.liquidity_locked_weight = liquidity_weight(&*pool, info.liquidity_locked_units)?;
        let commit = self.prepare(account, info)?;

        pool.transfer(&self.address, &account, units)?;
        self.apply(commit);
        self.last_unlock_tx.insert(account, ctx.tx);

        debug!(%account, %units, "unlocked liquidity");
        Ok(())
    }

    /// Credit the caller's votes to `to` (zero or self takes them back)
    pub fn delegate(&mut self, ctx: &CallContext, to: Address) -> Result<()> {
        let account = ctx.caller;
        let info = self.realized(&account)?;
        let old_delegate = info.effective_delegate(&account);
        let new_delegate = if to.is_zero() { account } else { to };

        let commit = self.prepare(account, info)?;
        let weight = commit.new_balance;
        self.apply(commit);

        if old_delegate != new_delegate {
            self.record(Tracked::Votes(old_delegate));
            self.record(Tracked::Votes(new_delegate));

            // inbound counters are bounded by total supply
            if old_delegate != account {
                let counter = self.delegated_votes.entry(old_delegate).or_insert(0);
                *counter = counter.saturating_sub(weight);
            }
            if new_delegate != account {
                *self.delegated_votes.entry(new_delegate).or_insert(0) += weight;
            }
        }
        // stored as given; `effective_delegate` resolves zero and self
        if let Some(record) = self.accounts.get_mut(&account) {
            record.delegate = to;
        }

        debug!(%account, from = %old_delegate, to = %new_delegate, %weight, "delegated");
        Ok(())
    }

    /// Replace granted weight for a batch of accounts.
    ///
    /// The batch is all-or-nothing; a zero weight retires an entry.
    pub fn grant_weight(
        &mut self,
        ctx: &CallContext,
        accounts: &[Address],
        principal_equivalents: &[Amount],
        weights: &[Amount],
    ) -> Result<()> {
        self.roles.require(Role::WeightGranter, &ctx.caller)?;
        if accounts.len() != principal_equivalents.len() || accounts.len() != weights.len() {
            return Err(LedgerError::LengthMismatch {
                accounts: accounts.len(),
                principal_equivalents: principal_equivalents.len(),
                weights: weights.len(),
            });
        }

        let grants = accounts.iter().zip(principal_equivalents).zip(weights);
        self.check_grants(grants.clone())?;
        for ((account, principal), weight) in grants {
            let mut info = self.realized(account)?;
            info.granted_principal_equivalent = *principal;
            info.granted_weight = *weight;
            let commit = self.prepare(*account, info)?;
            self.apply(commit);
            if self.granted_seen.insert(*account) {
                self.granted_accounts.push(*account);
            }
        }

        info!(count = accounts.len(), total_supply = %self.total_supply, "granted weight");
        Ok(())
    }

    /// Distribute `amount` pro rata across current holders via fee growth
    pub fn donate(&mut self, ctx: &CallContext, base: &mut dyn Asset, amount: Amount) -> Result<()> {
        let donor = ctx.caller;
        let info = self.realized(&donor)?;
        let commit = self.prepare(donor, info)?;

        let supply = commit.new_total;
        let growth = if supply == 0 {
            None
        } else {
            let delta = mul_div(amount, PRECISION, supply).ok_or(LedgerError::Overflow)?;
            Some(self.fee_growth.checked_add(delta).ok_or(LedgerError::Overflow)?)
        };
        let unattributed = match growth {
            Some(_) => self.unattributed_donations,
            None => self
                .unattributed_donations
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?,
        };

        base.transfer(&donor, &self.address, amount)?;
        self.apply(commit);
        match growth {
            Some(fee_growth) => {
                self.fee_growth = fee_growth;
                debug!(%donor, %amount, %fee_growth, "donated");
            }
            None => {
                self.unattributed_donations = unattributed;
                info!(%donor, %amount, "donation with zero supply left unattributed");
            }
        }
        Ok(())
    }

    fn value_at(&self, key: Tracked, snapshot_id: SnapshotId) -> Result<Amount> {
        if snapshot_id == 0 || snapshot_id > self.snapshot_id {
            return Err(LedgerError::InvalidSnapshot {
                requested: snapshot_id,
                current: self.snapshot_id,
            });
        }
        Ok(self.history.query(&key, snapshot_id, || self.live(key)))
    }

    fn live(&self, key: Tracked) -> Amount {
        match key {
            Tracked::Balance(account) => self.balance_of(&account),
            Tracked::Votes(account) => self.votes(&account),
            Tracked::TotalSupply => self.total_supply,
        }
    }

    /// Writes go to the open period, one past the last snapshot
    fn record(&mut self, key: Tracked) {
        let value = self.live(key);
        self.history.write(key, self.snapshot_id + 1, value);
    }

    fn stage_lock(&self, account: Address, tx: TxId, amount: Amount) -> Result<Commit> {
        self.guard_lock(&account, tx)?;
        let mut info = self.realized(&account)?;
        info.locked_principal = info
            .locked_principal
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.prepare(account, info)
    }

    /// Replay a grant batch against the touched records only, so the apply
    /// pass that follows cannot fail halfway
    fn check_grants<'a>(
        &self,
        grants: impl Iterator<Item = ((&'a Address, &'a Amount), &'a Amount)>,
    ) -> Result<()> {
        let mut touched: HashMap<Address, AccountInfo> = HashMap::new();
        let mut delegated: HashMap<Address, Amount> = HashMap::new();
        let mut total = self.total_supply;

        for ((account, principal), weight) in grants {
            let (mut info, old_balance) = match touched.get(account) {
                Some(info) => (info.clone(), info.balance()),
                None => (self.realized(account)?, self.balance_of(account)),
            };
            info.granted_principal_equivalent = *principal;
            info.granted_weight = *weight;
            let new_balance = info.checked_balance().ok_or(LedgerError::Overflow)?;
            total = total
                .checked_sub(old_balance)
                .and_then(|rest| rest.checked_add(new_balance))
                .ok_or(LedgerError::Overflow)?;

            let delegate = info.effective_delegate(account);
            if delegate != *account {
                let current = delegated
                    .get(&delegate)
                    .or_else(|| self.delegated_votes.get(&delegate))
                    .copied()
                    .unwrap_or(0);
                let updated = current
                    .saturating_sub(old_balance)
                    .checked_add(new_balance)
                    .ok_or(LedgerError::Overflow)?;
                if old_balance != new_balance {
                    delegated.insert(delegate, updated);
                }
            }
            touched.insert(*account, info);
        }
        Ok(())
    }

    fn guard_lock(&self, account: &Address, tx: TxId) -> Result<()> {
        if self.last_unlock_tx.get(account) == Some(&tx) {
            return Err(LedgerError::SameTransactionLockUnlock(*account));
        }
        Ok(())
    }

    fn guard_unlock(&self, account: &Address, tx: TxId) -> Result<()> {
        if self.last_lock_tx.get(account) == Some(&tx) {
            return Err(LedgerError::SameTransactionLockUnlock(*account));
        }
        Ok(())
    }

    fn owed(&self, info: &AccountInfo) -> Result<Amount> {
        let growth = self.fee_growth.saturating_sub(info.last_fee_growth);
        mul_div(growth, info.balance(), PRECISION).ok_or(LedgerError::Overflow)
    }

    /// Copy of the account record with pending fee growth folded into principal
    fn realized(&self, account: &Address) -> Result<AccountInfo> {
        let mut info = self.account(account);
        let owed = self.owed(&info)?;
        info.locked_principal = info
            .locked_principal
            .checked_add(owed)
            .ok_or(LedgerError::Overflow)?;
        info.last_fee_growth = self.fee_growth;
        if owed > 0 {
            debug!(%account, %owed, "realized fee growth");
        }
        Ok(info)
    }

    fn prepare(&self, account: Address, updated: AccountInfo) -> Result<Commit> {
        let old_balance = self.balance_of(&account);
        let new_balance = updated.checked_balance().ok_or(LedgerError::Overflow)?;
        let new_total = self
            .total_supply
            .checked_sub(old_balance)
            .and_then(|rest| rest.checked_add(new_balance))
            .ok_or(LedgerError::Overflow)?;
        let delegate = updated.effective_delegate(&account);
        let new_delegated = if delegate == account {
            None
        } else {
            let current = self.delegated_votes.get(&delegate).copied().unwrap_or(0);
            Some(
                current
                    .saturating_sub(old_balance)
                    .checked_add(new_balance)
                    .ok_or(LedgerError::Overflow)?,
            )
        };
        Ok(Commit {
            account,
            updated,
            old_balance,
            new_balance,
            new_total,
            delegate,
            new_delegated,
        })
    }

    fn apply(&mut self, commit: Commit) {
        if commit.old_balance != commit.new_balance {
            self.record(Tracked::Balance(commit.account));
            self.record(Tracked::Votes(commit.delegate));
            self.record(Tracked::TotalSupply);
            self.total_supply = commit.new_total;
            if let Some(delegated) = commit.new_delegated {
                self.delegated_votes.insert(commit.delegate, delegated);
            }
        }
        self.accounts.insert(commit.account, commit.updated);
    }
}

/// Base-asset value of `units` at the pool's current spot ratio
fn liquidity_weight(pool: &dyn LiquidityPool, units: Amount) -> Result<Amount> {
    if units == 0 {
        return Ok(0);
    }
    let supply = pool.total_supply();
    if supply == 0 {
        return Err(LedgerError::EmptyLiquidityPool);
    }
    mul_div(units, pool.base_reserve(), supply).ok_or(LedgerError::Overflow)
}
