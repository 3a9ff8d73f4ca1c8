//! Weighted-sum reducer used to value a reserve vector
//!
//! Products are accumulated at full 256-bit width and shifted once, so a
//! vector of equal amounts under weights that sum to one unit comes back
//! exactly as that amount.

use ethnum::U256;
use ladder_types::{LadderError, LadderResult};

use crate::safe::{u256_to_u128, Rounding};

/// Σ weight_i × amount_i >> 64, rounded as requested
pub fn weighted_sum(weights: &[u128], amounts: &[u128], rounding: Rounding) -> LadderResult<u128> {
    if weights.len() != amounts.len() {
        return Err(LadderError::length_mismatch(weights.len(), amounts.len()));
    }

    let mut acc = U256::ZERO;
    for (weight, amount) in weights.iter().zip(amounts) {
        let product = U256::from(*weight) * U256::from(*amount);
        acc = acc
            .checked_add(product)
            .ok_or(LadderError::MathOverflow("weighted sum"))?;
    }

    let floor = acc >> 64u32;
    let value = match rounding {
        Rounding::Up if acc & U256::from(u64::MAX) != U256::ZERO => floor + U256::ONE,
        _ => floor,
    };

    u256_to_u128(value, "weighted sum")
}
