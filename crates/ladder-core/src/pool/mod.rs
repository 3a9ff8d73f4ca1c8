//! # Swap Pool
//!
//! Holds per-slot reserves of one ledger's instrument and trades them under
//! the weighted-sum invariant Σ w_i × reserve_i, re-weighted on every call
//! from the oracle price and the time left to settlement.
//!
//! The pool and its ledger refer to each other by address only. The
//! reserve vector is the pool's cached view of its ledger balance and is
//! reconciled against it (reserve <= balance, slot by slot) on every
//! state-changing call. Balance the ledger holds for the pool beyond its
//! reserves (plain transfers into the pool) is not traded and goes to the
//! owner on `destroy`.

mod liquidity;
mod trade;

use ladder_math::{weighted_sum, Rounding};
use ladder_types::{Address, LadderError, LadderResult, PoolConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::CallContext;
use crate::ledger::OptionLedger;
use crate::oracle::PriceOracle;
use crate::token::FungibleLedger;
use crate::weighting::{WeightCurve, WeightingFunction};

/// Snapshot returned by [`SwapPool::get_status`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    pub weights: Vec<u128>,
    pub reserves: Vec<u128>,
    /// Σ weight_i × reserve_i, rounded down
    pub invariant: u128,
}

/// Oracle-weighted CFMM over one ledger's slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapPool {
    config: PoolConfig,
    curve: WeightCurve,
    reserves: Vec<u128>,
    shares: FungibleLedger,
    initialized: bool,
    destroyed: bool,
}

impl SwapPool {
    pub fn new(config: PoolConfig, ledger: &OptionLedger) -> LadderResult<Self> {
        config.validate()?;
        if config.ledger != ledger.address() {
            return Err(LadderError::account_mismatch(config.ledger, ledger.address()));
        }

        let curve = WeightCurve::from(&config.curve);
        info!(
            pool = %config.address,
            ledger = %config.ledger,
            owner = %config.owner,
            ?curve,
            "swap pool created"
        );

        Ok(Self {
            reserves: vec![0; ledger.slot_count()],
            curve,
            config,
            shares: FungibleLedger::new(),
            initialized: false,
            destroyed: false,
        })
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn owner(&self) -> Address {
        self.config.owner
    }

    pub fn ledger_address(&self) -> Address {
        self.config.ledger
    }

    pub fn curve(&self) -> &WeightCurve {
        &self.curve
    }

    pub fn reserves(&self) -> &[u128] {
        &self.reserves
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// True while `now` is inside the trading window
    pub fn is_open(&self, now: u64) -> bool {
        (self.config.open_time..=self.config.close_time).contains(&now)
    }

    /// Current weight vector
    ///
    /// Once the ledger is settled the weights are the settlement weights
    /// and the oracle is not read.
    pub fn weights(
        &self,
        now: u64,
        ledger: &OptionLedger,
        oracle: &dyn PriceOracle,
    ) -> LadderResult<Vec<u128>> {
        self.ensure_ledger(ledger)?;
        if let Some(price) = ledger.settle_price() {
            return self.curve.compute_weights(ledger.strikes(), price, 0);
        }

        if oracle.address() != ledger.oracle_address() {
            return Err(LadderError::account_mismatch(
                ledger.oracle_address(),
                oracle.address(),
            ));
        }
        let price = oracle.get()?;
        let remaining = ledger.settle_time().saturating_sub(now);
        self.curve.compute_weights(ledger.strikes(), price, remaining)
    }

    /// Weights, live reserves and the invariant value at `now`
    pub fn get_status(
        &self,
        now: u64,
        ledger: &OptionLedger,
        oracle: &dyn PriceOracle,
    ) -> LadderResult<PoolStatus> {
        let weights = self.weights(now, ledger, oracle)?;
        let invariant = weighted_sum(&weights, &self.reserves, Rounding::Down)?;
        Ok(PoolStatus {
            weights,
            reserves: self.reserves.clone(),
            invariant,
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Adopt the pool's whole ledger balance as its reserves and mint the
    /// owner shares equal to its weighted value
    pub fn init(
        &mut self,
        call: &CallContext,
        ledger: &OptionLedger,
        oracle: &dyn PriceOracle,
    ) -> LadderResult<u128> {
        if self.destroyed {
            return Err(LadderError::PoolDestroyed);
        }
        if call.caller != self.config.owner {
            return Err(LadderError::NotOwner);
        }
        if self.initialized {
            return Err(LadderError::AlreadyInitialized);
        }
        self.ensure_ledger(ledger)?;
        if !ledger.is_bound_pool(self.address()) {
            return Err(LadderError::UnknownPool(self.address()));
        }

        let reserves = ledger.balance_of_all(self.address());
        let weights = self.weights(call.timestamp, ledger, oracle)?;
        let shares = weighted_sum(&weights, &reserves, Rounding::Down)?;
        if shares == 0 {
            return Err(LadderError::InvalidAmount);
        }

        self.shares.mint(self.config.owner, shares)?;
        self.reserves = reserves;
        self.initialized = true;

        info!(pool = %self.address(), shares, reserves = ?self.reserves, "pool initialized");
        Ok(shares)
    }

    /// Owner-only wind-down after the destroy time: sweep the pool's entire
    /// ledger balance to the owner and stop all trading and liquidity calls
    pub fn destroy(&mut self, call: &CallContext, ledger: &mut OptionLedger) -> LadderResult<Vec<u128>> {
        if call.caller != self.config.owner {
            return Err(LadderError::NotOwner);
        }
        if call.timestamp < self.config.destroy_time {
            return Err(LadderError::NotDestroyTime);
        }
        if self.destroyed {
            return Err(LadderError::PoolDestroyed);
        }
        self.ensure_ledger(ledger)?;

        let swept = ledger.balance_of_all(self.address());
        ledger.pool_release(self.address(), self.config.owner, &swept)?;

        self.reserves = vec![0; self.reserves.len()];
        self.destroyed = true;

        info!(pool = %self.address(), owner = %self.config.owner, ?swept, "pool destroyed");
        Ok(swept)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn ensure_ledger(&self, ledger: &OptionLedger) -> LadderResult<()> {
        if ledger.address() != self.config.ledger {
            return Err(LadderError::account_mismatch(self.config.ledger, ledger.address()));
        }
        Ok(())
    }

    fn ensure_live(&self) -> LadderResult<()> {
        if self.destroyed {
            return Err(LadderError::PoolDestroyed);
        }
        if !self.initialized {
            return Err(LadderError::NotInitialized);
        }
        Ok(())
    }

    /// Cached reserves must never exceed what the ledger holds for the pool
    fn reconcile(&self, ledger: &OptionLedger) -> LadderResult<()> {
        let held = ledger.balance_of_all(self.address());
        for (slot, (reserve, balance)) in self.reserves.iter().zip(&held).enumerate() {
            if reserve > balance {
                return Err(LadderError::InconsistentReserves { slot });
            }
        }
        Ok(())
    }
}
