//! Native value balances

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use dao_core::{Address, Amount, CallError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NativeBank {
    balances: HashMap<Address, Amount>,
}

impl NativeBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, account: &Address, amount: Amount) -> Result<(), CallError> {
        let balance = self.balances.entry(*account).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| CallError::Reverted("native balance overflow".to_string()))?;
        Ok(())
    }

    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), CallError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(CallError::InsufficientValue {
                requested: amount,
                available,
            });
        }
        if amount == 0 || from == to {
            return Ok(());
        }
        self.balances.insert(*from, available - amount);
        self.credit(to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer() {
        let (a, b) = (Address::from_low_u64(1), Address::from_low_u64(2));
        let mut bank = NativeBank::new();
        bank.credit(&a, 10).unwrap();
        bank.transfer(&a, &b, 4).unwrap();
        assert_eq!(bank.balance_of(&a), 6);
        assert_eq!(bank.balance_of(&b), 4);
        assert_eq!(
            bank.transfer(&b, &a, 5),
            Err(CallError::InsufficientValue { requested: 5, available: 4 })
        );
    }
}
