use ladder_types::{Address, LadderError, LadderResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{PriceOracle, TokenInfo};

/// Administered price, for fixtures and manually resolved markets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualOracle {
    address: Address,
    admin: Address,
    token0: TokenInfo,
    token1: TokenInfo,
    price: u128,
}

impl ManualOracle {
    pub fn new(
        address: Address,
        admin: Address,
        token0: TokenInfo,
        token1: TokenInfo,
        price: u128,
    ) -> Self {
        Self {
            address,
            admin,
            token0,
            token1,
            price,
        }
    }

    /// Publish a new price; only the admin may
    pub fn set_price(&mut self, caller: Address, price: u128) -> LadderResult<()> {
        if caller != self.admin {
            return Err(LadderError::NotOwner);
        }
        info!(oracle = %self.address, price, "manual price set");
        self.price = price;
        Ok(())
    }
}

impl PriceOracle for ManualOracle {
    fn address(&self) -> Address {
        self.address
    }

    fn get(&self) -> LadderResult<u128> {
        Ok(self.price)
    }

    fn token0(&self) -> &TokenInfo {
        &self.token0
    }

    fn token1(&self) -> &TokenInfo {
        &self.token1
    }

    fn symbol(&self) -> String {
        format!("ORA-m-{}/{}", self.token0.symbol, self.token1.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladder_types::Q64;

    #[test]
    fn test_only_admin_sets_price() {
        let admin = Address::from_low_u64(7);
        let mut oracle = ManualOracle::new(
            Address::from_low_u64(1),
            admin,
            TokenInfo::new(Address::from_low_u64(2), "ETH"),
            TokenInfo::new(Address::from_low_u64(3), "USD"),
            Q64,
        );

        assert_eq!(
            oracle.set_price(Address::from_low_u64(8), 2 * Q64),
            Err(LadderError::NotOwner)
        );
        oracle.set_price(admin, 2 * Q64).unwrap();
        assert_eq!(oracle.get().unwrap(), 2 * Q64);
        assert_eq!(oracle.symbol(), "ORA-m-ETH/USD");
    }
}
