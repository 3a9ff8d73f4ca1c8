//! Account identifiers.
//!
//! Holders, pools, oracles and tokens are all addressed by a 20-byte
//! identifier. The ledger and the pool refer to each other only through
//! these keys, never through shared references.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::LadderError;

/// 20-byte account identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address; never a valid transfer destination
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address whose low 8 bytes hold `value` (big-endian)
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = LadderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| LadderError::Config(format!("invalid address '{}': {}", s, e)))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let addr = Address::from_low_u64(0xdead_beef);
        let text = addr.to_string();
        assert_eq!(text, "0x00000000000000000000000000000000deadbeef");
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("zz00000000000000000000000000000000000000".parse::<Address>().is_err());
        assert!(matches!(
            "0x00000000000000000000000000000000deadbeef00".parse::<Address>(),
            Err(LadderError::Config(_))
        ));
    }

    #[test]
    fn test_parse_accepts_bare_and_upper_case_hex() {
        let addr = Address::from_low_u64(0xdead_beef);
        assert_eq!(
            "00000000000000000000000000000000DEADBEEF".parse::<Address>().unwrap(),
            addr
        );
    }

    #[test]
    fn test_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_low_u64(1).is_zero());
    }
}
