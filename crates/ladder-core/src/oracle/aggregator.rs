//! Price-feed aggregator oracle: a signed answer with a fixed number of
//! decimals, converted to Q64.64.

use ladder_math::{mul_div, Rounding};
use ladder_types::{Address, LadderError, LadderResult, Q64};

use super::{Pair, PriceOracle, TokenInfo};

/// Source of aggregated answers
pub trait AggregatorSource {
    /// Latest answer, scaled by `10^decimals()`
    fn latest_answer(&self) -> LadderResult<i128>;

    fn decimals(&self) -> u8;
}

/// Oracle over a price-feed aggregator
#[derive(Debug, Clone)]
pub struct AggregatorOracle<S> {
    address: Address,
    source: S,
    pair: Pair,
}

impl<S: AggregatorSource> AggregatorOracle<S> {
    pub fn new(address: Address, source: S, token0: TokenInfo, token1: TokenInfo, inverse: bool) -> Self {
        Self {
            address,
            source,
            pair: Pair::new(token0, token1, inverse),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: AggregatorSource> PriceOracle for AggregatorOracle<S> {
    fn address(&self) -> Address {
        self.address
    }

    fn get(&self) -> LadderResult<u128> {
        let answer = self.source.latest_answer()?;
        if answer <= 0 {
            return Err(LadderError::InvalidPrice);
        }

        let unit = 10u128
            .checked_pow(self.source.decimals() as u32)
            .ok_or(LadderError::MathOverflow("aggregator decimals"))?;
        let price = mul_div(answer as u128, Q64, unit, Rounding::Down)?;
        self.pair.orient(price)
    }

    fn token0(&self) -> &TokenInfo {
        &self.pair.token0
    }

    fn token1(&self) -> &TokenInfo {
        &self.pair.token1
    }

    fn symbol(&self) -> String {
        self.pair.symbol('c')
    }
}
