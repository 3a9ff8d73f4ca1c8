//! # Oracle Module
//!
//! Spot-price oracles read by the ledger at settlement and by the pool on
//! every weighting. All prices are Q64.64 values of token0 in token1 (or the
//! reciprocal when an oracle is built inverted). Oracles are read-only and
//! make no freshness claims; staleness belongs to the source.

pub mod aggregator;
pub mod manual;
pub mod sqrt_price;

pub use aggregator::*;
pub use manual::*;
pub use sqrt_price::*;

use ladder_math::div_q64;
use ladder_types::{Address, LadderError, LadderResult, Q64};
use serde::{Deserialize, Serialize};

/// Read-only price feed
pub trait PriceOracle {
    /// Address the oracle is known under
    fn address(&self) -> Address;

    /// Current spot price, Q64.64
    fn get(&self) -> LadderResult<u128>;

    /// Token whose price is reported
    fn token0(&self) -> &TokenInfo;

    /// Token the price is quoted in
    fn token1(&self) -> &TokenInfo;

    /// Source kind and pair, e.g. `ORA-c-ABC/DEF`
    fn symbol(&self) -> String;
}

/// Identity of one side of an oracle pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
}

impl TokenInfo {
    pub fn new(address: Address, symbol: impl Into<String>) -> Self {
        Self {
            address,
            symbol: symbol.into(),
        }
    }
}

/// Orientation of a two-token source
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pair {
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    pub inverse: bool,
}

impl Pair {
    /// Swap the reported tokens when inverted
    pub fn new(token0: TokenInfo, token1: TokenInfo, inverse: bool) -> Self {
        if inverse {
            Self { token0: token1, token1: token0, inverse }
        } else {
            Self { token0, token1, inverse }
        }
    }

    /// Apply the inversion flag to a source price
    pub fn orient(&self, price: u128) -> LadderResult<u128> {
        if price == 0 {
            return Err(LadderError::InvalidPrice);
        }
        if self.inverse {
            let inverted = div_q64(Q64, price)?;
            if inverted == 0 {
                return Err(LadderError::InvalidPrice);
            }
            return Ok(inverted);
        }
        Ok(price)
    }

    pub fn symbol(&self, kind: char) -> String {
        format!("ORA-{}-{}/{}", kind, self.token0.symbol, self.token1.symbol)
    }
}
