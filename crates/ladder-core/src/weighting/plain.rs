use ladder_types::LadderResult;
use serde::{Deserialize, Serialize};

use super::{lognormal_weights, WeightingFunction};

/// Static smoothing: a fixed log-width around the spot price until the
/// settle instant, then the bare hat weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainCurve {
    /// Log standard deviation, Q64.64
    pub width: u128,
}

impl PlainCurve {
    pub fn new(width: u128) -> Self {
        Self { width }
    }
}

impl WeightingFunction for PlainCurve {
    fn compute_weights(
        &self,
        strikes: &[u128],
        price: u128,
        time_remaining: u64,
    ) -> LadderResult<Vec<u128>> {
        let spread = if time_remaining == 0 { 0 } else { self.width };
        lognormal_weights(strikes, price, spread)
    }
}
