//! Ledger side of the pool: binding, the two swap entry points, and the
//! only paths that may move a bound pool's balance.

use ladder_types::{Address, LadderError, LadderResult};
use tracing::info;

use super::OptionLedger;
use crate::collateral::CollateralToken;
use crate::context::CallContext;
use crate::oracle::PriceOracle;
use crate::pool::SwapPool;

impl OptionLedger {
    /// Protect `pool`'s balance and allow it to trade against this ledger
    pub fn bind_pool(&mut self, pool: &SwapPool) -> LadderResult<()> {
        if pool.ledger_address() != self.address() {
            return Err(LadderError::account_mismatch(self.address(), pool.ledger_address()));
        }
        self.pools.insert(pool.address());
        info!(ledger = %self.address(), pool = %pool.address(), "pool bound");
        Ok(())
    }

    /// Trade against `pool`: the caller pays `in_amounts` into the pool and
    /// receives `out_amounts` from it, if the pool accepts the trade
    pub fn swap(
        &mut self,
        call: &CallContext,
        pool: &mut SwapPool,
        oracle: &dyn PriceOracle,
        out_amounts: &[u128],
        in_amounts: &[u128],
    ) -> LadderResult<()> {
        self.ensure_bound(pool)?;
        self.check_len(out_amounts)?;
        self.check_len(in_amounts)?;
        let trader = call.caller;
        self.ensure_unprotected(trader)?;

        let reserves = pool.quote_trade(call, self, oracle, out_amounts, in_amounts)?;
        let pool_address = pool.address();
        self.atomically(&[trader, pool_address], |book| {
            book.exchange(trader, pool_address, out_amounts, in_amounts)
        })?;
        pool.commit_reserves(reserves);

        info!(
            ledger = %self.address(),
            pool = %pool_address,
            trader = %trader,
            ?out_amounts,
            ?in_amounts,
            "swapped"
        );
        Ok(())
    }

    /// Swap and mint (`is_deposit`) or burn `collateral_delta` full sets in
    /// the same call
    ///
    /// Minting happens before the trade, so fresh units can pay for it;
    /// burning happens after, so units received from the pool can be burned.
    #[allow(clippy::too_many_arguments)]
    pub fn out_swap(
        &mut self,
        call: &CallContext,
        pool: &mut SwapPool,
        oracle: &dyn PriceOracle,
        collateral: &mut dyn CollateralToken,
        out_amounts: &[u128],
        in_amounts: &[u128],
        collateral_delta: u128,
        is_deposit: bool,
    ) -> LadderResult<()> {
        self.ensure_collateral(collateral)?;
        self.ensure_bound(pool)?;
        self.check_len(out_amounts)?;
        self.check_len(in_amounts)?;
        let trader = call.caller;
        self.ensure_unprotected(trader)?;

        let reserves = pool.quote_trade(call, self, oracle, out_amounts, in_amounts)?;
        let pool_address = pool.address();
        let ledger = self.address();
        self.atomically(&[trader, pool_address], |book| {
            if is_deposit {
                book.issue(trader, collateral_delta)?;
                book.exchange(trader, pool_address, out_amounts, in_amounts)?;
                collateral.transfer_from(ledger, trader, ledger, collateral_delta)
            } else {
                book.exchange(trader, pool_address, out_amounts, in_amounts)?;
                book.retire(trader, collateral_delta)?;
                collateral.transfer(ledger, trader, collateral_delta)
            }
        })?;
        pool.commit_reserves(reserves);

        info!(
            ledger = %ledger,
            pool = %pool_address,
            trader = %trader,
            collateral_delta,
            is_deposit,
            "swapped with collateral"
        );
        Ok(())
    }

    /// Pool liquidity path: move `amounts` from `from` into the pool
    pub(crate) fn pool_deposit(
        &mut self,
        pool: Address,
        from: Address,
        amounts: &[u128],
    ) -> LadderResult<()> {
        if !self.pools.contains(&pool) {
            return Err(LadderError::UnknownPool(pool));
        }
        self.ensure_unprotected(from)?;
        self.atomically(&[from, pool], |book| book.move_slots(from, pool, amounts))
    }

    /// Pool liquidity/destroy path: release `amounts` of the pool's balance
    pub(crate) fn pool_release(
        &mut self,
        pool: Address,
        to: Address,
        amounts: &[u128],
    ) -> LadderResult<()> {
        if !self.pools.contains(&pool) {
            return Err(LadderError::UnknownPool(pool));
        }
        if to.is_zero() {
            return Err(LadderError::ZeroAddress);
        }
        self.atomically(&[pool, to], |book| book.move_slots(pool, to, amounts))
    }

    /// Trader pays `in_amounts` to the pool, pool pays `out_amounts` back
    fn exchange(
        &mut self,
        trader: Address,
        pool: Address,
        out_amounts: &[u128],
        in_amounts: &[u128],
    ) -> LadderResult<()> {
        self.move_slots(trader, pool, in_amounts)?;
        self.move_slots(pool, trader, out_amounts)
    }

    fn ensure_bound(&self, pool: &SwapPool) -> LadderResult<()> {
        if pool.ledger_address() != self.address() {
            return Err(LadderError::account_mismatch(self.address(), pool.ledger_address()));
        }
        if !self.pools.contains(&pool.address()) {
            return Err(LadderError::UnknownPool(pool.address()));
        }
        Ok(())
    }
}
