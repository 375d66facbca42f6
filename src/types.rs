//! Common types used throughout the crate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OracleError;

/// A `0x`-prefixed hex identifier for an on-chain entity.
///
/// Accepts 20-byte contract/token addresses and 32-byte identifiers
/// (price-feed ids). Normalized to lowercase on construction so that
/// lookups and equality are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address.
    pub fn parse(raw: &str) -> Result<Self, OracleError> {
        let hex_part = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| OracleError::InvalidAddress(raw.to_string()))?;

        let bytes = hex::decode(hex_part)
            .map_err(|_| OracleError::InvalidAddress(raw.to_string()))?;
        if bytes.len() != 20 && bytes.len() != 32 {
            return Err(OracleError::InvalidAddress(raw.to_string()));
        }

        Ok(Self(format!("0x{}", hex::encode(bytes))))
    }

    /// The normalized `0x`-prefixed string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = OracleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// Identifier assigned to a registered pricing strategy.
///
/// Ids are sequential from 0, strictly increasing, and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct StrategyId(pub u32);

impl StrategyId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of pricing strategy families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Balancer-style weighted or composable-stable pools.
    Weighted,
    /// Concentrated-liquidity pools with elliptic curve parameters.
    ConcentratedLiquidity,
    /// Uniswap-V2-style two-token pools.
    ConstantProduct,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Weighted => write!(f, "weighted"),
            StrategyKind::ConcentratedLiquidity => write!(f, "concentrated_liquidity"),
            StrategyKind::ConstantProduct => write!(f, "constant_product"),
        }
    }
}

/// Raw reading from an external price feed.
///
/// `answer` is the feed's integer answer at the feed's declared decimals.
/// It is signed so that a non-positive answer is caught by validation
/// instead of wrapping into a huge unsigned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSample {
    pub answer: i128,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_normalizes_case() {
        let a = Address::parse("0xAB594600376Ec9fD91F8e885dADF0CE036862dE0").unwrap();
        let b = Address::parse("0xab594600376ec9fd91f8e885dadf0ce036862de0").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0xab594600376ec9fd91f8e885dadf0ce036862de0");
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!(Address::parse("ab594600376ec9fd91f8e885dadf0ce036862de0").is_err());
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0xzz594600376ec9fd91f8e885dadf0ce036862de0").is_err());
    }

    #[test]
    fn test_strategy_id_is_sequential() {
        let id = StrategyId::default();
        assert_eq!(id, StrategyId(0));
        assert_eq!(id.next(), StrategyId(1));
        assert_eq!(id.next().next(), StrategyId(2));
    }

    #[test]
    fn test_strategy_kind_serde_round_trip() {
        let json = serde_json::to_string(&StrategyKind::ConcentratedLiquidity).unwrap();
        assert_eq!(json, "\"concentrated_liquidity\"");
        let kind: StrategyKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, StrategyKind::ConcentratedLiquidity);
    }
}
