//! Constant-product (x · y = k) fair valuation.
//!
//! The fair value of the pool is `2·sqrt(k · p0 · p1)`: the portfolio value
//! the pool would hold after arbitrageurs move the reserves to the
//! feed-implied equilibrium. Dividing by supply prices one LP token.

use rust_decimal::Decimal;

use crate::error::OracleError;
use crate::math::{checked_div, checked_mul, checked_sqrt};
use crate::pools::NormalizedPool;

pub(crate) fn price_usd(
    pool: &NormalizedPool,
    prices_usd: &[Decimal],
) -> Result<Decimal, OracleError> {
    if pool.assets.len() != 2 {
        return Err(OracleError::InvalidPoolState(format!(
            "constant-product pools hold exactly 2 assets, got {}",
            pool.assets.len()
        )));
    }

    let k = checked_mul(pool.reserves[0], pool.reserves[1])?;
    let price_product = checked_mul(prices_usd[0], prices_usd[1])?;
    let fair_value = checked_mul(
        Decimal::TWO,
        checked_sqrt(checked_mul(k, price_product)?)?,
    )?;

    checked_div(fair_value, pool.total_supply)
}
