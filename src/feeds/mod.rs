//! Price feed interfaces.
//!
//! A [`FeedReference`] names one external price source for one underlying
//! asset. The registry resolves references through a [`PriceFeedSource`]
//! at query time; samples are validated against the staleness bound and
//! scaled into USD before any pool math runs.

pub mod hermes;

pub use hermes::HermesFeedSource;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::types::{Address, PriceSample};

/// Handle to one external price source for one underlying asset.
///
/// Order within a feed list is significant: position `i` prices the pool's
/// `i`-th priced asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedReference {
    /// Address of the external feed.
    pub source: Address,
    /// Underlying asset the feed prices.
    pub asset: Address,
    /// Decimal precision of the feed's integer answers.
    pub decimals: u32,
}

/// Read-only access to external price feeds.
///
/// Implementations take `&self` and must not touch registry state; a feed
/// read can abort a query but can never mutate it.
#[async_trait]
pub trait PriceFeedSource: Send + Sync {
    /// Latest price reported by the feed at `feed`.
    async fn latest_price(&self, feed: &Address) -> anyhow::Result<PriceSample>;
}

/// Validate a raw sample and scale it into a USD price.
///
/// Rejects non-positive answers and samples older than `max_age_secs`.
/// A sample timestamped slightly in the future (clock skew between the
/// feed and this host) is accepted.
pub fn checked_usd_price(
    reference: &FeedReference,
    sample: &PriceSample,
    now: DateTime<Utc>,
    max_age_secs: i64,
) -> Result<Decimal, OracleError> {
    if sample.answer <= 0 {
        return Err(OracleError::NegativeOrZeroPrice {
            asset: reference.asset.clone(),
        });
    }

    let age_secs = (now - sample.updated_at).num_seconds();
    if age_secs > max_age_secs {
        return Err(OracleError::StaleFeed {
            feed: reference.source.clone(),
            age_secs,
            max_age_secs,
        });
    }

    Decimal::try_from_i128_with_scale(sample.answer, reference.decimals)
        .map_err(|_| OracleError::Overflow("feed price"))
}
