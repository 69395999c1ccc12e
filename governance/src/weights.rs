//! Vote-weight source consumed by the engine

use dao_core::{Address, Amount, CallContext, SnapshotId};
use dao_ledger::{LedgerError, WeightLedger};

pub trait VotingWeights {
    /// Live balance, gates proposal creation
    fn balance_of(&self, account: &Address) -> Amount;

    /// Live delegated weight, counted when a vote is cast
    fn votes(&self, account: &Address) -> Amount;

    fn total_supply(&self) -> Amount;

    /// Close the current period. `ctx.caller` must be allowed to snapshot.
    fn snapshot(&mut self, ctx: &CallContext) -> Result<SnapshotId, LedgerError>;
}

impl VotingWeights for WeightLedger {
    fn balance_of(&self, account: &Address) -> Amount {
        WeightLedger::balance_of(self, account)
    }

    fn votes(&self, account: &Address) -> Amount {
        WeightLedger::votes(self, account)
    }

    fn total_supply(&self) -> Amount {
        WeightLedger::total_supply(self)
    }

    fn snapshot(&mut self, ctx: &CallContext) -> Result<SnapshotId, LedgerError> {
        WeightLedger::snapshot(self, ctx)
    }
}
