//! # Fungible Balance Ledger
//!
//! Balance and allowance book used for a pool's liquidity shares and for
//! the plain collateral token. Callers are identified by address; the book
//! itself does no access control beyond allowances.

use std::collections::BTreeMap;

use ladder_types::{Address, LadderError, LadderResult, UNLIMITED_ALLOWANCE};
use serde::{Deserialize, Serialize};

/// Balances, allowances and total supply of one fungible unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleLedger {
    total_supply: u128,
    balances: BTreeMap<Address, u128>,
    /// owner -> spender -> remaining allowance
    allowances: BTreeMap<Address, BTreeMap<Address, u128>>,
}

impl FungibleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, holder: Address) -> u128 {
        self.balances.get(&holder).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or(0)
    }

    /// Create `amount` new units for `to`
    pub fn mint(&mut self, to: Address, amount: u128) -> LadderResult<()> {
        if to.is_zero() {
            return Err(LadderError::ZeroAddress);
        }

        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LadderError::MathOverflow("share supply"))?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LadderError::MathOverflow("share balance"))?;

        self.total_supply = supply;
        self.set_balance(to, balance);
        Ok(())
    }

    /// Destroy `amount` units held by `from`
    pub fn burn(&mut self, from: Address, amount: u128) -> LadderResult<()> {
        let balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(LadderError::ExceedsShareBalance)?;

        // supply >= any single balance
        self.total_supply -= amount;
        self.set_balance(from, balance);
        Ok(())
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> LadderResult<()> {
        if to.is_zero() {
            return Err(LadderError::ZeroAddress);
        }

        let from_balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(LadderError::ExceedsShareBalance)?;
        if from == to {
            return Ok(());
        }

        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LadderError::MathOverflow("share balance"))?;

        self.set_balance(from, from_balance);
        self.set_balance(to, to_balance);
        Ok(())
    }

    /// Set the allowance `spender` may draw from `owner`
    pub fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> LadderResult<()> {
        if spender.is_zero() {
            return Err(LadderError::ZeroAddress);
        }

        self.allowances.entry(owner).or_default().insert(spender, amount);
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`
    ///
    /// The allowance is checked before the balance. An unlimited allowance
    /// is never decremented.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> LadderResult<()> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(LadderError::InsufficientAllowance);
        }
        if to.is_zero() {
            return Err(LadderError::ZeroAddress);
        }
        if self.balance_of(from) < amount {
            return Err(LadderError::ExceedsShareBalance);
        }

        self.transfer(from, to, amount)?;

        if allowance != UNLIMITED_ALLOWANCE {
            self.allowances
                .entry(from)
                .or_default()
                .insert(spender, allowance - amount);
        }
        Ok(())
    }

    fn set_balance(&mut self, holder: Address, balance: u128) {
        if balance == 0 {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, balance);
        }
    }
}
