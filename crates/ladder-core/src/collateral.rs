//! # Collateral Token Interface
//!
//! The ledger only needs the four calls below from its collateral. Each
//! failure is a distinct error; there is no boolean success flag.

use ladder_types::{Address, LadderError, LadderResult};
use serde::{Deserialize, Serialize};

use crate::token::FungibleLedger;

/// Fungible token the ledger accepts as collateral
pub trait CollateralToken {
    /// Address the token is deployed at
    fn address(&self) -> Address;

    fn balance_of(&self, holder: Address) -> u128;

    /// `from` sends `amount` of its own balance to `to`
    fn transfer(&mut self, from: Address, to: Address, amount: u128) -> LadderResult<()>;

    /// `spender` moves `amount` from `from` to `to` using its allowance
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> LadderResult<()>;

    fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> LadderResult<()>;
}

/// Plain in-process fungible token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleToken {
    address: Address,
    symbol: String,
    book: FungibleLedger,
}

impl SimpleToken {
    pub fn new(address: Address, symbol: impl Into<String>) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            book: FungibleLedger::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_supply(&self) -> u128 {
        self.book.total_supply()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.book.allowance(owner, spender)
    }

    /// Issue new tokens (faucet)
    pub fn mint(&mut self, to: Address, amount: u128) -> LadderResult<()> {
        self.book.mint(to, amount)
    }
}

/// Token holders run short of balance, not of shares
fn balance_error(err: LadderError) -> LadderError {
    match err {
        LadderError::ExceedsShareBalance => LadderError::InsufficientBalance,
        other => other,
    }
}

impl CollateralToken for SimpleToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, holder: Address) -> u128 {
        self.book.balance_of(holder)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: u128) -> LadderResult<()> {
        self.book.transfer(from, to, amount).map_err(balance_error)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> LadderResult<()> {
        self.book
            .transfer_from(spender, from, to, amount)
            .map_err(balance_error)
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> LadderResult<()> {
        self.book.approve(owner, spender, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collateral_errors_are_balance_errors() {
        let alice = Address::from_low_u64(1);
        let ledger = Address::from_low_u64(2);
        let mut token = SimpleToken::new(Address::from_low_u64(3), "USDC");
        token.mint(alice, 5).unwrap();

        assert_eq!(
            token.transfer_from(ledger, alice, ledger, 5),
            Err(LadderError::InsufficientAllowance)
        );

        token.approve(alice, ledger, 10).unwrap();
        assert_eq!(
            token.transfer_from(ledger, alice, ledger, 6),
            Err(LadderError::InsufficientBalance)
        );

        token.transfer_from(ledger, alice, ledger, 5).unwrap();
        assert_eq!(token.balance_of(ledger), 5);
        assert_eq!(token.allowance(alice, ledger), 5);
    }

    #[test]
    fn test_zero_value_transfer() {
        let mut token = SimpleToken::new(Address::from_low_u64(3), "USDC");
        token
            .transfer(Address::from_low_u64(1), Address::from_low_u64(2), 0)
            .unwrap();
    }
}
