//! Pricing strategies.
//!
//! Each strategy turns a [`NormalizedPool`] plus per-asset USD prices into
//! the fair USD value of one LP token. All strategies derive the value from
//! the pool's invariant at the feed-implied equilibrium, never from the raw
//! reserve split, so a single-block skew of the reserves cannot move the
//! answer.
//!
//! Dispatch is a closed `match` over [`StrategyKind`]: the set of strategy
//! families is known at compile time, so there is no dynamic lookup.

pub mod constant_product;
pub mod eclp;
pub mod weighted;

use rust_decimal::Decimal;

use crate::error::OracleError;
use crate::math::USD_SCALE;
use crate::pools::NormalizedPool;
use crate::types::StrategyKind;

/// Compute the USD price of one LP token.
///
/// `prices_usd[i]` is the USD price of `pool.assets[i]`. The meaning of
/// `variant_flag` is strategy-specific:
///
/// - [`StrategyKind::Weighted`]: `true` values the pool at uniform weights
///   (composable-stable pools), `false` uses the pool-reported weights.
/// - [`StrategyKind::ConcentratedLiquidity`]: selects which asset anchors
///   the relative price fed into the curve solve (`false` = asset 0,
///   `true` = asset 1).
/// - [`StrategyKind::ConstantProduct`]: no variants; `true` is rejected
///   with [`OracleError::UnsupportedVariant`].
pub fn compute_price_usd(
    kind: StrategyKind,
    pool: &NormalizedPool,
    prices_usd: &[Decimal],
    variant_flag: bool,
) -> Result<Decimal, OracleError> {
    if prices_usd.len() != pool.assets.len() {
        return Err(OracleError::FeedCountMismatch {
            expected: pool.assets.len(),
            actual: prices_usd.len(),
        });
    }
    for (asset, price) in pool.assets.iter().zip(prices_usd) {
        if *price <= Decimal::ZERO {
            return Err(OracleError::NegativeOrZeroPrice {
                asset: asset.clone(),
            });
        }
    }

    let price = match kind {
        StrategyKind::Weighted => weighted::price_usd(pool, prices_usd, variant_flag)?,
        StrategyKind::ConcentratedLiquidity => eclp::price_usd(pool, prices_usd, variant_flag)?,
        StrategyKind::ConstantProduct => {
            if variant_flag {
                return Err(OracleError::UnsupportedVariant { kind });
            }
            constant_product::price_usd(pool, prices_usd)?
        }
    };

    Ok(price.round_dp(USD_SCALE))
}
