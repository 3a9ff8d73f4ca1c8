//! AMM-pool oracle: squares a Q64.96 square-root price and divides out a
//! decimal scale (token decimals differ between the two sides).

use ethnum::U256;
use ladder_math::{div_u256, Rounding};
use ladder_types::{Address, LadderResult};

use super::{Pair, PriceOracle, TokenInfo};

/// Source of a Q64.96 square-root price
pub trait SqrtPriceSource {
    fn sqrt_price_x96(&self) -> LadderResult<u128>;
}

/// Oracle over an AMM pool's square-root price
#[derive(Debug, Clone)]
pub struct SqrtPriceOracle<S> {
    address: Address,
    source: S,
    pair: Pair,
    /// 10^(decimals1 - decimals0) as Q64.64
    scale: u128,
}

impl<S: SqrtPriceSource> SqrtPriceOracle<S> {
    pub fn new(
        address: Address,
        source: S,
        token0: TokenInfo,
        token1: TokenInfo,
        scale: u128,
        inverse: bool,
    ) -> Self {
        Self {
            address,
            source,
            pair: Pair::new(token0, token1, inverse),
            scale,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: SqrtPriceSource> PriceOracle for SqrtPriceOracle<S> {
    fn address(&self) -> Address {
        self.address
    }

    fn get(&self) -> LadderResult<u128> {
        let sqrt = U256::from(self.source.sqrt_price_x96()?);
        // (sqrt / 2^96)^2 / (scale / 2^64) in Q64.64 == sqrt^2 / (scale * 2^64)
        let denominator = U256::from(self.scale) << 64u32;
        let price = div_u256(sqrt * sqrt, denominator, Rounding::Down, "sqrt price")?;
        self.pair.orient(price)
    }

    fn token0(&self) -> &TokenInfo {
        &self.pair.token0
    }

    fn token1(&self) -> &TokenInfo {
        &self.pair.token1
    }

    fn symbol(&self) -> String {
        self.pair.symbol('u')
    }
}
