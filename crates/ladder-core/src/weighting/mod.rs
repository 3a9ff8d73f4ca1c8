//! # Slot Weighting
//!
//! Maps a spot price and the time left to settlement onto one weight per
//! slot. Slot i is anchored at strike b_i and pays along the piecewise-linear
//! "hat" basis at settlement. Before settlement the hat payoff is averaged
//! over a lognormal distribution of the settle price:
//!
//! ```text
//! g_j = (C(b_j) - C(b_j+1)) / (b_j+1 - b_j)       C(K) = E[(P - K)+]
//! w_0 = 1 - g_0,   w_j = g_j-1 - g_j,   w_N-1 = g_N-2
//! ```
//!
//! `g` is clamped to [0, 1] and forced non-increasing, so every weight is in
//! [0, 1] and the vector sums to exactly one Q64.64 unit by telescoping.

pub mod black_scholes;
pub mod plain;

pub use black_scholes::*;
pub use plain::*;

use ladder_math::{
    ln_q64, mul_div, mul_div_signed, mul_q64, norm_cdf_q64, safe_sub_u128, Rounding,
};
use ladder_types::{CurveConfig, LadderError, LadderResult, MIN_SLOTS, Q64};
use serde::{Deserialize, Serialize};

/// |d| beyond this is a certain exercise (or a certain miss)
const D_LIMIT: i128 = 16 * Q64 as i128;

/// Largest log standard deviation fed to the lognormal model
pub const MAX_SPREAD: u128 = 4 * Q64;

/// Shared interface of the weighting curves
pub trait WeightingFunction {
    /// Weight per slot for `price` with `time_remaining` seconds to go
    fn compute_weights(
        &self,
        strikes: &[u128],
        price: u128,
        time_remaining: u64,
    ) -> LadderResult<Vec<u128>>;
}

/// Curve variant selected when a pool is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightCurve {
    Plain(PlainCurve),
    BlackScholes(BlackScholesCurve),
}

impl From<&CurveConfig> for WeightCurve {
    fn from(config: &CurveConfig) -> Self {
        match *config {
            CurveConfig::Plain { width } => WeightCurve::Plain(PlainCurve::new(width)),
            CurveConfig::BlackScholes {
                width,
                volatility,
                option_kind,
            } => WeightCurve::BlackScholes(BlackScholesCurve::new(width, volatility, option_kind)),
        }
    }
}

impl WeightingFunction for WeightCurve {
    fn compute_weights(
        &self,
        strikes: &[u128],
        price: u128,
        time_remaining: u64,
    ) -> LadderResult<Vec<u128>> {
        match self {
            WeightCurve::Plain(curve) => curve.compute_weights(strikes, price, time_remaining),
            WeightCurve::BlackScholes(curve) => {
                curve.compute_weights(strikes, price, time_remaining)
            }
        }
    }
}

/// Settlement weights: the hat basis evaluated at `price`
pub fn hat_weights(strikes: &[u128], price: u128) -> LadderResult<Vec<u128>> {
    lognormal_weights(strikes, price, 0)
}

/// Weights under a lognormal settle price with log standard deviation
/// `spread` around `forward` (all Q64.64)
pub fn lognormal_weights(strikes: &[u128], forward: u128, spread: u128) -> LadderResult<Vec<u128>> {
    if strikes.len() < MIN_SLOTS {
        return Err(LadderError::invalid_parameter("strikes", "fewer than two strikes"));
    }

    let mut gaps = Vec::with_capacity(strikes.len() - 1);
    for pair in strikes.windows(2) {
        let gap = safe_sub_u128(pair[1], pair[0])?;
        if gap == 0 {
            return Err(LadderError::invalid_parameter("strikes", "must be strictly increasing"));
        }
        gaps.push(gap);
    }

    let mut exceed = if spread == 0 || forward == 0 {
        intrinsic_exceedance(strikes, &gaps, forward)?
    } else {
        smoothed_exceedance(strikes, &gaps, forward, spread.min(MAX_SPREAD))?
    };

    // g_j must be in [0, 1] and non-increasing
    let mut ceiling = Q64;
    for g in exceed.iter_mut() {
        *g = (*g).min(ceiling);
        ceiling = *g;
    }

    let n = strikes.len();
    let mut weights = Vec::with_capacity(n);
    weights.push(Q64 - exceed[0]);
    for j in 1..n - 1 {
        weights.push(exceed[j - 1] - exceed[j]);
    }
    weights.push(exceed[n - 2]);

    Ok(weights)
}

/// g_j with no uncertainty left: position of `price` inside gap j
fn intrinsic_exceedance(strikes: &[u128], gaps: &[u128], price: u128) -> LadderResult<Vec<u128>> {
    strikes
        .iter()
        .zip(gaps)
        .map(|(&low, &gap)| {
            if price <= low {
                Ok(0)
            } else if price - low >= gap {
                Ok(Q64)
            } else {
                mul_div(price - low, Q64, gap, Rounding::Down)
            }
        })
        .collect()
}

/// g_j from differences of lognormal call values
fn smoothed_exceedance(
    strikes: &[u128],
    gaps: &[u128],
    forward: u128,
    spread: u128,
) -> LadderResult<Vec<u128>> {
    let ln_forward = ln_q64(forward)?;
    let calls = strikes
        .iter()
        .map(|&strike| call_value(forward, strike, spread, ln_forward))
        .collect::<LadderResult<Vec<u128>>>()?;

    calls
        .windows(2)
        .zip(gaps)
        .map(|(pair, &gap)| {
            let drop = pair[0].saturating_sub(pair[1]);
            Ok(mul_div(drop, Q64, gap, Rounding::Down)?.min(Q64))
        })
        .collect()
}

/// E[(P - K)+] for lognormal P with mean `forward` and log sd `spread`
fn call_value(forward: u128, strike: u128, spread: u128, ln_forward: i128) -> LadderResult<u128> {
    let ln_ratio = ln_forward - ln_q64(strike)?;
    let half_variance = (mul_q64(spread, spread)? / 2) as i128;

    let d1 = bounded_ratio(ln_ratio + half_variance, spread)?;
    let d2 = d1 - spread as i128;

    let upside = mul_q64(forward, norm_cdf_q64(d1)?)?;
    let cost = mul_q64(strike, norm_cdf_q64(d2)?)?;
    Ok(upside.saturating_sub(cost))
}

/// numerator / spread, saturated at ±D_LIMIT
fn bounded_ratio(numerator: i128, spread: u128) -> LadderResult<i128> {
    if numerator.unsigned_abs() >= spread.saturating_mul(16) {
        return Ok(if numerator < 0 { -D_LIMIT } else { D_LIMIT });
    }
    mul_div_signed(numerator, Q64, spread)
}
