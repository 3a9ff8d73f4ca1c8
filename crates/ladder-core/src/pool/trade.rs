//! Trade acceptance.
//!
//! A trade is priced at the current weights. Value paid in is rounded down,
//! value taken out is rounded up and multiplied by the fee rate, so every
//! rounding step favors the pool. The post-trade invariant is checked
//! against the pre-trade one at the same weights as a final guard.

use ladder_math::{safe_mul_q64_up, weighted_sum, Rounding};
use ladder_types::{LadderError, LadderResult};
use tracing::debug;

use super::SwapPool;
use crate::context::CallContext;
use crate::ledger::OptionLedger;
use crate::oracle::PriceOracle;

impl SwapPool {
    /// Check a trade and return the reserves it would leave; changes nothing
    pub fn quote_trade(
        &self,
        call: &CallContext,
        ledger: &OptionLedger,
        oracle: &dyn PriceOracle,
        out_amounts: &[u128],
        in_amounts: &[u128],
    ) -> LadderResult<Vec<u128>> {
        self.ensure_live()?;
        self.ensure_ledger(ledger)?;
        if ledger.is_settled() || !self.is_open(call.timestamp) {
            return Err(LadderError::MarketClosed);
        }

        let slots = self.reserves.len();
        for amounts in [out_amounts, in_amounts] {
            if amounts.len() != slots {
                return Err(LadderError::length_mismatch(slots, amounts.len()));
            }
        }
        self.reconcile(ledger)?;

        let mut post = Vec::with_capacity(slots);
        for (slot, ((reserve, paid_in), taken_out)) in self
            .reserves
            .iter()
            .zip(in_amounts)
            .zip(out_amounts)
            .enumerate()
        {
            let available = reserve
                .checked_add(*paid_in)
                .ok_or(LadderError::MathOverflow("pool reserve"))?;
            let remaining = available
                .checked_sub(*taken_out)
                .ok_or(LadderError::InsufficientPoolLiquidity { slot })?;
            post.push(remaining);
        }

        let weights = self.weights(call.timestamp, ledger, oracle)?;
        let value_in = weighted_sum(&weights, in_amounts, Rounding::Down)?;
        let value_out = safe_mul_q64_up(
            weighted_sum(&weights, out_amounts, Rounding::Up)?,
            self.config.fee_rate,
        )?;

        debug!(
            pool = %self.address(),
            value_in,
            value_out,
            ?weights,
            "trade priced"
        );

        if value_in < value_out {
            return Err(LadderError::PriceMismatchCheck { value_in, value_out });
        }

        let before = weighted_sum(&weights, &self.reserves, Rounding::Down)?;
        let after = weighted_sum(&weights, &post, Rounding::Down)?;
        if after < before {
            return Err(LadderError::PriceMismatchCheck {
                value_in: after,
                value_out: before,
            });
        }

        Ok(post)
    }

    /// Adopt reserves from an accepted quote once the ledger has moved the
    /// balances
    pub(crate) fn commit_reserves(&mut self, reserves: Vec<u128>) {
        self.reserves = reserves;
    }
}
