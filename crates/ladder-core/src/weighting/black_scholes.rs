//! Time-decaying lognormal weighting.
//!
//! The log standard deviation is `volatility * sqrt(time_remaining)`, never
//! below the configured width while time remains, and zero at the settle
//! instant. A call ledger is collateralized in the priced asset, so its
//! weights are taken in asset numeraire: the forward shifts to `p * e^{s^2}`.

use ladder_math::{exp_q64, mul_q64, sqrt_q64, u64_to_q64};
use ladder_types::{LadderResult, OptionKind};
use serde::{Deserialize, Serialize};

use super::{lognormal_weights, WeightingFunction, MAX_SPREAD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackScholesCurve {
    /// Floor on the log standard deviation, Q64.64
    pub width: u128,
    /// Per square-root second, Q64.64
    pub volatility: u128,
    pub option_kind: OptionKind,
}

impl BlackScholesCurve {
    pub fn new(width: u128, volatility: u128, option_kind: OptionKind) -> Self {
        Self {
            width,
            volatility,
            option_kind,
        }
    }

    /// Log standard deviation left with `time_remaining` seconds to go
    pub fn spread(&self, time_remaining: u64) -> LadderResult<u128> {
        if time_remaining == 0 {
            return Ok(0);
        }
        let root_time = sqrt_q64(u64_to_q64(time_remaining))?;
        let diffusion = mul_q64(self.volatility, root_time)?;
        Ok(diffusion.max(self.width).min(MAX_SPREAD))
    }
}

impl WeightingFunction for BlackScholesCurve {
    fn compute_weights(
        &self,
        strikes: &[u128],
        price: u128,
        time_remaining: u64,
    ) -> LadderResult<Vec<u128>> {
        let spread = self.spread(time_remaining)?;

        let forward = match self.option_kind {
            OptionKind::Put => price,
            OptionKind::Call if spread == 0 => price,
            OptionKind::Call => {
                let variance = mul_q64(spread, spread)?;
                mul_q64(price, exp_q64(variance as i128)?)?
            }
        };

        lognormal_weights(strikes, forward, spread)
    }
}
