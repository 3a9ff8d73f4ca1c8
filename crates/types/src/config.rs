use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::address::Address;
use crate::constants::{MAX_SLOTS, MIN_FEE_RATE, MIN_SLOTS};
use crate::errors::LadderError;
use crate::LadderResult;

/// Immutable configuration of one option ledger
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Address the ledger itself is reachable at
    pub address: Address,

    /// Collateral token accepted by `mint`
    pub collateral: Address,

    /// Oracle read by `settle` and by every pool weighting
    pub oracle: Address,

    /// Earliest instant `settle` may run (unix seconds)
    pub settle_time: u64,

    /// Strictly increasing strike ladder, Q64.64 prices
    #[serde(with = "q64_string::vec")]
    pub strikes: Vec<u128>,
}

/// Which token the collateral is, seen from the oracle pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Collateral is the priced asset (token0)
    Call,
    /// Collateral is the quote currency (token1)
    Put,
}

/// Weighting curve selected for a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveConfig {
    /// Static lognormal smoothing of fixed width
    Plain {
        #[serde(with = "q64_string")]
        width: u128,
    },
    /// Time-decaying lognormal smoothing driven by volatility
    BlackScholes {
        #[serde(with = "q64_string")]
        width: u128,
        /// Per square-root second, Q64.64
        #[serde(with = "q64_string")]
        volatility: u128,
        option_kind: OptionKind,
    },
}

/// Immutable configuration of one swap pool
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Address the pool holds ledger balances under
    pub address: Address,

    /// Only account allowed to `init` and `destroy`
    pub owner: Address,

    /// Ledger whose instrument the pool trades
    pub ledger: Address,

    /// First instant trades are accepted
    #[serde(default)]
    pub open_time: u64,

    /// Last instant trades are accepted
    pub close_time: u64,

    /// Earliest instant the owner may wind the pool down
    pub destroy_time: u64,

    /// Multiplier charged on value leaving the pool, Q64.64 (>= 1.0)
    #[serde(with = "q64_string")]
    pub fee_rate: u128,

    pub curve: CurveConfig,
}

/// A ledger and its pool, as a deployer wires them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MarketConfig {
    pub ledger: LedgerConfig,
    pub pool: PoolConfig,
}

impl LedgerConfig {
    /// Validate configuration
    pub fn validate(&self) -> LadderResult<()> {
        if self.address.is_zero() || self.collateral.is_zero() || self.oracle.is_zero() {
            return Err(LadderError::ZeroAddress);
        }

        let n = self.strikes.len();
        if !(MIN_SLOTS..=MAX_SLOTS).contains(&n) {
            return Err(LadderError::invalid_parameter(
                "strikes",
                format!("{} strikes, expected {}..={}", n, MIN_SLOTS, MAX_SLOTS),
            ));
        }

        if self.strikes[0] == 0 {
            return Err(LadderError::invalid_parameter("strikes", "first strike is zero"));
        }

        if self.strikes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(LadderError::invalid_parameter(
                "strikes",
                "must be strictly increasing",
            ));
        }

        Ok(())
    }

    pub fn slot_count(&self) -> usize {
        self.strikes.len()
    }
}

impl PoolConfig {
    /// Validate configuration
    pub fn validate(&self) -> LadderResult<()> {
        if self.address.is_zero() || self.owner.is_zero() || self.ledger.is_zero() {
            return Err(LadderError::ZeroAddress);
        }

        if self.open_time > self.close_time {
            return Err(LadderError::invalid_parameter(
                "open_time",
                format!("{} is after close_time {}", self.open_time, self.close_time),
            ));
        }

        if self.close_time > self.destroy_time {
            return Err(LadderError::invalid_parameter(
                "destroy_time",
                format!("{} is before close_time {}", self.destroy_time, self.close_time),
            ));
        }

        if self.fee_rate < MIN_FEE_RATE {
            return Err(LadderError::invalid_parameter("fee_rate", "must be at least 1.0"));
        }

        Ok(())
    }
}

impl MarketConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> LadderResult<Self> {
        let config: MarketConfig = toml::from_str(content)
            .map_err(|e| LadderError::Config(format!("failed to parse market config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> LadderResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LadderError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> LadderResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| LadderError::Config(format!("failed to serialize market config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> LadderResult<()> {
        self.ledger.validate()?;
        self.pool.validate()?;

        if self.pool.ledger != self.ledger.address {
            return Err(LadderError::account_mismatch(self.ledger.address, self.pool.ledger));
        }

        Ok(())
    }
}

/// Serde helper carrying Q64.64 values as strings.
///
/// TOML integers stop at i64, so values travel as text. A string containing
/// a '.' is read as a decimal real number and converted (rounded down); any
/// other string, or a bare integer, is taken as the raw 64.64 bits.
pub mod q64_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::constants::Q64;

    /// Most fractional digits accepted in decimal form
    const MAX_FRACTION_DIGITS: u32 = 18;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
    }

    pub fn parse(text: &str) -> Result<u128, String> {
        let text = text.trim();
        match text.split_once('.') {
            None => text
                .parse::<u128>()
                .map_err(|e| format!("invalid Q64.64 bits '{}': {}", text, e)),
            Some((int_part, frac_part)) => {
                let frac_part = frac_part.trim_end_matches('0');
                if frac_part.len() as u32 > MAX_FRACTION_DIGITS {
                    return Err(format!("too many fractional digits in '{}'", text));
                }

                let int_value: u128 = if int_part.is_empty() {
                    0
                } else {
                    int_part
                        .parse()
                        .map_err(|e| format!("invalid integer part in '{}': {}", text, e))?
                };
                let whole = int_value
                    .checked_mul(Q64)
                    .ok_or_else(|| format!("'{}' does not fit 64.64", text))?;

                if frac_part.is_empty() {
                    return Ok(whole);
                }

                let digits: u128 = frac_part
                    .parse()
                    .map_err(|e| format!("invalid fraction in '{}': {}", text, e))?;
                let scale = 10u128.pow(frac_part.len() as u32);
                let fraction = (digits << 64) / scale;

                whole
                    .checked_add(fraction)
                    .ok_or_else(|| format!("'{}' does not fit 64.64", text))
            }
        }
    }

    fn from_raw(raw: Raw) -> Result<u128, String> {
        match raw {
            Raw::Text(text) => parse(&text),
            Raw::Int(value) => Ok(value as u128),
        }
    }

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = Raw::deserialize(deserializer)?;
        from_raw(raw).map_err(serde::de::Error::custom)
    }

    pub mod vec {
        use super::*;
        use serde::ser::SerializeSeq;

        pub fn serialize<S: Serializer>(values: &[u128], serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for value in values {
                seq.serialize_element(&value.to_string())?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<u128>, D::Error> {
            let raws = Vec::<Raw>::deserialize(deserializer)?;
            raws.into_iter()
                .map(|raw| from_raw(raw).map_err(serde::de::Error::custom))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;

    const SAMPLE: &str = r#"
[ledger]
address = "0x00000000000000000000000000000000000000a1"
collateral = "0x00000000000000000000000000000000000000c0"
oracle = "0x00000000000000000000000000000000000000d0"
settle_time = 1700000200
strikes = ["0.5", "1.0", "1.5", "2.0"]

[pool]
address = "0x00000000000000000000000000000000000000b1"
owner = "0x0000000000000000000000000000000000000001"
ledger = "0x00000000000000000000000000000000000000a1"
close_time = 1700000100
destroy_time = 1700000300
fee_rate = "1.0078125"

[pool.curve]
kind = "black_scholes"
width = "0.01"
volatility = "416757209401000000"
option_kind = "call"
"#;

    fn sample() -> String {
        SAMPLE.to_string()
    }

    #[test]
    fn test_load_market_config() {
        let config = MarketConfig::from_toml_str(&sample()).unwrap();

        assert_eq!(config.ledger.strikes, vec![Q64 / 2, Q64, Q64 + Q64 / 2, 2 * Q64]);
        assert_eq!(config.pool.fee_rate, Q64 + Q64 / 128);
        assert_eq!(config.pool.open_time, 0);
        match config.pool.curve {
            CurveConfig::BlackScholes { volatility, option_kind, .. } => {
                assert_eq!(volatility, 416_757_209_401_000_000);
                assert_eq!(option_kind, OptionKind::Call);
            }
            other => panic!("unexpected curve {:?}", other),
        }
    }

    #[test]
    fn test_toml_round_trip_preserves_values() {
        let config = MarketConfig::from_toml_str(&sample()).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(MarketConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_unsorted_strikes() {
        let text = sample().replace(r#"["0.5", "1.0", "1.5", "2.0"]"#, r#"["1.0", "0.5"]"#);
        let err = MarketConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, LadderError::InvalidParameter { name: "strikes", .. }));
    }

    #[test]
    fn test_rejects_mismatched_ledger() {
        let text = sample().replace(
            "ledger = \"0x00000000000000000000000000000000000000a1\"",
            "ledger = \"0x00000000000000000000000000000000000000a2\"",
        );
        let err = MarketConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, LadderError::AccountMismatch { .. }));
    }

    #[test]
    fn test_rejects_fee_below_one() {
        let text = sample().replace("\"1.0078125\"", "\"0.99\"");
        let err = MarketConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, LadderError::InvalidParameter { name: "fee_rate", .. }));
    }

    #[test]
    fn test_q64_decimal_parsing() {
        assert_eq!(q64_string::parse("1.5").unwrap(), Q64 + Q64 / 2);
        assert_eq!(q64_string::parse("0.25").unwrap(), Q64 / 4);
        assert_eq!(q64_string::parse("12345").unwrap(), 12345);
        assert_eq!(q64_string::parse(".5").unwrap(), Q64 / 2);
        assert!(q64_string::parse("1.0000000000000000001").is_err());
        assert!(q64_string::parse("abc").is_err());
    }

    #[test]
    fn test_ladder_bounds() {
        let mut config = MarketConfig::from_toml_str(&sample()).unwrap().ledger;
        config.strikes = vec![Q64];
        assert!(config.validate().is_err());
        config.strikes = (1..=17).map(|i| i as u128 * Q64).collect();
        assert!(config.validate().is_err());
        config.strikes = (1..=16).map(|i| i as u128 * Q64).collect();
        assert!(config.validate().is_ok());
    }
}
