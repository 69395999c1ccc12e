//! Fungible asset capabilities and in-memory reference tokens

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::address::Address;
use crate::error::AssetError;
use crate::Amount;

/// A fungible asset the ledger can pull from and pay out of
pub trait Asset {
    fn address(&self) -> Address;

    fn balance_of(&self, account: &Address) -> Amount;

    fn total_supply(&self) -> Amount;

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), AssetError>;
}

/// A liquidity-position token backed by a base-asset reserve
pub trait LiquidityPool: Asset {
    /// Base-asset amount currently held by the pool
    fn base_reserve(&self) -> Amount;
}

/// Balance-map token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryToken {
    address: Address,
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl MemoryToken {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balances: HashMap::new(),
            total_supply: 0,
        }
    }

    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), AssetError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        *self.balances.entry(*to).or_insert(0) += amount;
        self.total_supply = supply;
        Ok(())
    }

    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter().filter(|(_, balance)| **balance > 0)
    }
}

impl Asset for MemoryToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), AssetError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                account: *from,
                requested: amount,
                available,
            });
        }
        if amount == 0 || from == to {
            return Ok(());
        }
        self.balances.insert(*from, available - amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

/// Liquidity token whose reserve is set by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryPool {
    units: MemoryToken,
    base_reserve: Amount,
}

impl MemoryPool {
    pub fn new(address: Address) -> Self {
        Self {
            units: MemoryToken::new(address),
            base_reserve: 0,
        }
    }

    pub fn mint(&mut self, to: &Address, units: Amount) -> Result<(), AssetError> {
        self.units.mint(to, units)
    }

    pub fn set_base_reserve(&mut self, reserve: Amount) {
        self.base_reserve = reserve;
    }
}

impl Asset for MemoryPool {
    fn address(&self) -> Address {
        self.units.address()
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.units.balance_of(account)
    }

    fn total_supply(&self) -> Amount {
        self.units.total_supply()
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), AssetError> {
        self.units.transfer(from, to, amount)
    }
}

impl LiquidityPool for MemoryPool {
    fn base_reserve(&self) -> Amount {
        self.base_reserve
    }
}
