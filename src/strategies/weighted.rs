//! Weighted-pool (Balancer style) fair valuation.
//!
//! With invariant `V = Π rᵢ^{wᵢ}`, the portfolio value at the feed-implied
//! equilibrium is `V · Π (pᵢ / wᵢ)^{wᵢ}`, independent of the current
//! reserve split. Composable-stable pools are valued the same way at
//! uniform weights, with the pool's own token already removed by snapshot
//! normalization.

use rust_decimal::Decimal;

use crate::error::OracleError;
use crate::math::{checked_div, checked_mul, checked_pow};
use crate::pools::{NormalizedParams, NormalizedPool};

pub(crate) fn price_usd(
    pool: &NormalizedPool,
    prices_usd: &[Decimal],
    uniform_weights: bool,
) -> Result<Decimal, OracleError> {
    let weights = if uniform_weights {
        let n = Decimal::from(pool.assets.len() as u64);
        vec![checked_div(Decimal::ONE, n)?; pool.assets.len()]
    } else {
        match &pool.params {
            NormalizedParams::Weighted { weights } => weights.clone(),
            _ => {
                return Err(OracleError::InvalidPoolState(
                    "pool reports no token weights".to_string(),
                ))
            }
        }
    };

    let mut fair_value = Decimal::ONE;
    for ((reserve, price), weight) in pool.reserves.iter().zip(prices_usd).zip(&weights) {
        let invariant_term = checked_pow(*reserve, *weight)?;
        let price_term = checked_pow(checked_div(*price, *weight)?, *weight)?;
        fair_value = checked_mul(fair_value, checked_mul(invariant_term, price_term)?)?;
    }

    checked_div(fair_value, pool.total_supply)
}
