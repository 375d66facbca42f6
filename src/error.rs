//! Unified error type for the oracle registry.
//!
//! Every fallible operation in the crate returns [`OracleError`]. A failed
//! operation aborts as a whole: no partial registry state is committed and
//! no partial price is ever returned.

use thiserror::Error;

use crate::types::{Address, StrategyId, StrategyKind};

#[derive(Debug, Error)]
pub enum OracleError {
    /// The strategy id has never been assigned by the directory.
    #[error("strategy {0} is not registered")]
    UnknownStrategy(StrategyId),

    /// The implementation address is already present in the directory.
    #[error("implementation {0} is already registered")]
    DuplicateImplementation(Address),

    /// The feed list does not line up with the pool's priced assets.
    #[error("pool has {expected} priced assets but {actual} feeds were supplied")]
    FeedCountMismatch { expected: usize, actual: usize },

    /// No oracle record exists for the LP token.
    #[error("no oracle is bound for LP token {0}")]
    UnboundToken(Address),

    /// Reserves, weights or curve parameters are zero or malformed.
    #[error("invalid pool state: {0}")]
    InvalidPoolState(String),

    /// A feed's last update is older than the configured staleness bound.
    #[error("feed {feed} is stale: updated {age_secs}s ago, bound is {max_age_secs}s")]
    StaleFeed {
        feed: Address,
        age_secs: i64,
        max_age_secs: i64,
    },

    /// An input price for an asset is zero or below.
    #[error("non-positive price for asset {asset}")]
    NegativeOrZeroPrice { asset: Address },

    /// The variant flag has no meaning for the bound strategy kind.
    #[error("variant flag is not supported by the {kind} strategy")]
    UnsupportedVariant { kind: StrategyKind },

    /// The string is not a valid `0x`-prefixed 20-byte hex address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The pool snapshot reader failed.
    #[error("pool read failed: {0}")]
    PoolRead(#[source] anyhow::Error),

    /// A price feed read failed.
    #[error("feed read failed: {0}")]
    FeedRead(#[source] anyhow::Error),

    /// Intermediate arithmetic left the representable range.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// The durable record store could not be read or written.
    #[error("record store error: {0}")]
    Store(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_failed_precondition() {
        let err = OracleError::FeedCountMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "pool has 3 priced assets but 2 feeds were supplied"
        );

        let err = OracleError::UnknownStrategy(StrategyId(7));
        assert_eq!(err.to_string(), "strategy 7 is not registered");

        let err = OracleError::UnsupportedVariant {
            kind: StrategyKind::ConstantProduct,
        };
        assert_eq!(
            err.to_string(),
            "variant flag is not supported by the constant_product strategy"
        );
    }
}
