//! Action dispatch for everything the engine can call
//!
//! The view borrows the world's parts except the engine, so the engine can be
//! executing while its actions land here.

use tracing::debug;

use dao_core::{Action, Asset, CallContext, CallError, CallHost, MemoryPool, MemoryToken};
use dao_ledger::{LedgerAssets, LedgerCall, WeightLedger};

use crate::native::NativeBank;
use crate::token::TokenCall;

pub struct Host<'a> {
    pub native: &'a mut NativeBank,
    pub base: &'a mut MemoryToken,
    pub pool: &'a mut MemoryPool,
    pub ledger: &'a mut WeightLedger,
}

impl Host<'_> {
    fn token_call(&mut self, ctx: &CallContext, action: &Action) -> Result<(), CallError> {
        let token = action.target;
        let asset: &mut dyn Asset = if token == self.base.address() {
            &mut *self.base
        } else {
            &mut *self.pool
        };
        match action.decode_payload::<TokenCall>()? {
            TokenCall::Transfer { to, amount } => asset
                .transfer(&ctx.caller, &to, amount)
                .map_err(|e| CallError::Reverted(e.to_string())),
            TokenCall::TransferAndCall { to, amount } => {
                if to != self.ledger.address() {
                    return Err(CallError::UnknownTarget(to));
                }
                asset
                    .transfer(&ctx.caller, &to, amount)
                    .map_err(|e| CallError::Reverted(e.to_string()))?;
                debug!(from = %ctx.caller, %token, %amount, "token transfer into ledger");
                self.ledger
                    .on_token_transfer(&ctx.with_caller(token), &*self.base, ctx.caller, amount)
                    .map_err(|e| CallError::Reverted(e.to_string()))
            }
        }
    }
}

impl CallHost for Host<'_> {
    fn perform_call(&mut self, ctx: CallContext, action: &Action) -> Result<(), CallError> {
        let target = action.target;
        if action.value > 0 {
            self.native.transfer(&ctx.caller, &target, action.value)?;
        }
        if action.payload.is_empty() {
            debug!(from = %ctx.caller, to = %target, value = %action.value, "value transfer");
            return Ok(());
        }

        if target == self.ledger.address() {
            let call: LedgerCall = action.decode_payload()?;
            debug!(caller = %ctx.caller, ?call, "ledger call");
            let assets = LedgerAssets {
                base: &mut *self.base,
                pool: &mut *self.pool,
            };
            self.ledger
                .dispatch(&ctx, call, assets)
                .map(|_| ())
                .map_err(|e| CallError::Reverted(e.to_string()))
        } else if target == self.base.address() || target == self.pool.address() {
            self.token_call(&ctx, action)
        } else {
            Err(CallError::UnknownTarget(target))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_core::{units, Address};

    struct Parts {
        native: NativeBank,
        base: MemoryToken,
        pool: MemoryPool,
        ledger: WeightLedger,
    }

    impl Parts {
        fn new() -> Self {
            let mut native = NativeBank::new();
            let mut base = MemoryToken::new(Address::from_low_u64(100));
            native.credit(&Address::from_low_u64(2), 10).unwrap();
            base.mint(&Address::from_low_u64(2), units(5)).unwrap();
            Self {
                native,
                base,
                pool: MemoryPool::new(Address::from_low_u64(200)),
                ledger: WeightLedger::new(Address::from_low_u64(50), Address::from_low_u64(1)),
            }
        }

        fn host(&mut self) -> Host<'_> {
            Host {
                native: &mut self.native,
                base: &mut self.base,
                pool: &mut self.pool,
                ledger: &mut self.ledger,
            }
        }
    }

    fn ctx(caller: u64) -> CallContext {
        CallContext::new(Address::from_low_u64(caller), 1, 0)
    }

    #[test]
    fn test_value_transfer() {
        let mut parts = Parts::new();
        let to = Address::from_low_u64(3);
        parts.host().perform_call(ctx(2), &Action::transfer(to, 4)).unwrap();
        assert_eq!(parts.native.balance_of(&to), 4);

        assert!(matches!(
            parts.host().perform_call(ctx(2), &Action::transfer(to, 7)),
            Err(CallError::InsufficientValue { requested: 7, available: 6 })
        ));
    }

    #[test]
    fn test_ledger_and_token_calls() {
        let mut parts = Parts::new();
        let lock = LedgerCall::Lock { amount: units(2) }
            .into_action(Address::from_low_u64(50))
            .unwrap();
        parts.host().perform_call(ctx(2), &lock).unwrap();
        assert_eq!(parts.ledger.balance_of(&Address::from_low_u64(2)), units(2));

        let pay = TokenCall::Transfer {
            to: Address::from_low_u64(3),
            amount: units(1),
        }
        .into_action(Address::from_low_u64(100))
        .unwrap();
        parts.host().perform_call(ctx(2), &pay).unwrap();
        assert_eq!(parts.base.balance_of(&Address::from_low_u64(3)), units(1));
        assert_eq!(parts.base.balance_of(&Address::from_low_u64(2)), units(2));
    }

    #[test]
    fn test_transfer_and_call_locks_in_ledger() {
        let mut parts = Parts::new();
        let send = TokenCall::TransferAndCall {
            to: Address::from_low_u64(50),
            amount: units(3),
        }
        .into_action(Address::from_low_u64(100))
        .unwrap();
        parts.host().perform_call(ctx(2), &send).unwrap();
        assert_eq!(parts.base.balance_of(&Address::from_low_u64(50)), units(3));
        assert_eq!(
            parts.ledger.account(&Address::from_low_u64(2)).locked_principal,
            units(3)
        );
        assert_eq!(parts.ledger.total_supply(), units(3));

        // pool units sent the same way are not the locked asset
        parts.pool.mint(&Address::from_low_u64(2), 10).unwrap();
        let units_in = TokenCall::TransferAndCall {
            to: Address::from_low_u64(50),
            amount: 10,
        }
        .into_action(Address::from_low_u64(200))
        .unwrap();
        assert!(matches!(
            parts.host().perform_call(ctx(2), &units_in),
            Err(CallError::Reverted(_))
        ));

        let elsewhere = TokenCall::TransferAndCall {
            to: Address::from_low_u64(3),
            amount: 1,
        }
        .into_action(Address::from_low_u64(100))
        .unwrap();
        assert_eq!(
            parts.host().perform_call(ctx(2), &elsewhere),
            Err(CallError::UnknownTarget(Address::from_low_u64(3)))
        );
    }

    #[test]
    fn test_unknown_target_with_payload() {
        let mut parts = Parts::new();
        let stray = Action {
            target: Address::from_low_u64(77),
            value: 0,
            payload: vec![0xbe, 0xef],
        };
        assert_eq!(
            parts.host().perform_call(ctx(2), &stray),
            Err(CallError::UnknownTarget(Address::from_low_u64(77)))
        );
    }

    #[test]
    fn test_ledger_rejection_surfaces_as_revert() {
        let mut parts = Parts::new();
        let unlock = LedgerCall::Unlock { amount: 1 }
            .into_action(Address::from_low_u64(50))
            .unwrap();
        assert!(matches!(
            parts.host().perform_call(ctx(2), &unlock),
            Err(CallError::Reverted(_))
        ));
    }
}
