//! Proportional liquidity and the liquidity-share token surface.

use ladder_math::{mul_div, safe_add_u128, Rounding};
use ladder_types::{Address, LadderError, LadderResult, Q64};
use tracing::info;

use super::SwapPool;
use crate::context::CallContext;
use crate::ledger::OptionLedger;

impl SwapPool {
    /// Deposit `fraction` (Q64.64) of the current reserves and receive the
    /// same fraction of the share supply
    ///
    /// Deposits and shares both round down. Closed once the ledger is
    /// settled; only withdrawals remain.
    pub fn liquid_in(
        &mut self,
        call: &CallContext,
        ledger: &mut OptionLedger,
        fraction: u128,
    ) -> LadderResult<u128> {
        self.ensure_live()?;
        self.ensure_ledger(ledger)?;
        if ledger.is_settled() {
            return Err(LadderError::MarketClosed);
        }
        if fraction == 0 {
            return Err(LadderError::InvalidAmount);
        }
        self.reconcile(ledger)?;

        let amounts = self
            .reserves
            .iter()
            .map(|reserve| mul_div(*reserve, fraction, Q64, Rounding::Down))
            .collect::<LadderResult<Vec<u128>>>()?;
        let minted = mul_div(fraction, self.shares.total_supply(), Q64, Rounding::Down)?;

        let reserves = self
            .reserves
            .iter()
            .zip(&amounts)
            .map(|(reserve, amount)| safe_add_u128(*reserve, *amount))
            .collect::<LadderResult<Vec<u128>>>()?;
        safe_add_u128(self.shares.total_supply(), minted)?;

        ledger.pool_deposit(self.address(), call.caller, &amounts)?;
        self.shares.mint(call.caller, minted)?;
        self.reserves = reserves;

        info!(
            pool = %self.address(),
            provider = %call.caller,
            minted,
            ?amounts,
            "liquidity added"
        );
        Ok(minted)
    }

    /// Burn `shares` and withdraw the matching slice of every reserve
    ///
    /// Withdrawals round down. Not limited to the trading window.
    pub fn liquid_out(
        &mut self,
        call: &CallContext,
        ledger: &mut OptionLedger,
        shares: u128,
    ) -> LadderResult<Vec<u128>> {
        self.ensure_live()?;
        self.ensure_ledger(ledger)?;
        if shares == 0 {
            return Err(LadderError::InvalidAmount);
        }
        if self.shares.balance_of(call.caller) < shares {
            return Err(LadderError::ExceedsShareBalance);
        }
        self.reconcile(ledger)?;

        let total = self.shares.total_supply();
        let amounts = self
            .reserves
            .iter()
            .map(|reserve| mul_div(*reserve, shares, total, Rounding::Down))
            .collect::<LadderResult<Vec<u128>>>()?;

        ledger.pool_release(self.address(), call.caller, &amounts)?;
        self.shares.burn(call.caller, shares)?;
        for (reserve, amount) in self.reserves.iter_mut().zip(&amounts) {
            *reserve -= *amount;
        }

        info!(
            pool = %self.address(),
            provider = %call.caller,
            burned = shares,
            ?amounts,
            "liquidity removed"
        );
        Ok(amounts)
    }

    // ========================================================================
    // Liquidity Shares
    // ========================================================================

    /// Share balance of `holder`
    pub fn liq_pool_share(&self, holder: Address) -> u128 {
        self.shares.balance_of(holder)
    }

    /// Total share supply
    pub fn liq_pool_share_all(&self) -> u128 {
        self.shares.total_supply()
    }

    pub fn total_supply(&self) -> u128 {
        self.shares.total_supply()
    }

    pub fn balance_of(&self, holder: Address) -> u128 {
        self.shares.balance_of(holder)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.shares.allowance(owner, spender)
    }

    pub fn transfer(&mut self, call: &CallContext, to: Address, amount: u128) -> LadderResult<()> {
        self.shares.transfer(call.caller, to, amount)
    }

    pub fn approve(&mut self, call: &CallContext, spender: Address, amount: u128) -> LadderResult<()> {
        self.shares.approve(call.caller, spender, amount)
    }

    pub fn transfer_from(
        &mut self,
        call: &CallContext,
        from: Address,
        to: Address,
        amount: u128,
    ) -> LadderResult<()> {
        self.shares.transfer_from(call.caller, from, to, amount)
    }
}
