//! Elliptic concentrated-liquidity fair valuation.
//!
//! The pool's trading curve is the image of a circle arc of radius `r`
//! (the invariant) under a rotation by `(c, s)` and a stretch `lambda`.
//! Pricing works entirely in the circle frame:
//!
//! 1. recover `r` from the current reserves by solving the circle-frame
//!    quadratic,
//! 2. map the feed-implied relative price into the circle frame and solve
//!    for the fair reserve split at that price,
//! 3. value the fair split with the feed prices.
//!
//! Because step 1 only depends on the invariant, a reserve skew along the
//! curve cannot move the answer.

use rust_decimal::Decimal;

use crate::error::OracleError;
use crate::math::{checked_add, checked_div, checked_mul, checked_sqrt, checked_sub};
use crate::pools::{EclpParams, NormalizedParams, NormalizedPool};

/// A point or direction, in either the ellipse or the circle frame.
#[derive(Debug, Clone, Copy)]
struct Vec2 {
    x: Decimal,
    y: Decimal,
}

/// Relative price `px` mapped into the circle frame.
fn zeta(p: &EclpParams, px: Decimal) -> Result<Decimal, OracleError> {
    let num = checked_mul(p.lambda, checked_sub(checked_mul(p.c, px)?, p.s)?)?;
    let den = checked_add(p.c, checked_mul(p.s, px)?)?;
    checked_div(num, den)
}

/// Unit tangent point of the circle at circle-frame price `zeta(px)`.
fn tau(p: &EclpParams, px: Decimal) -> Result<Vec2, OracleError> {
    let z = zeta(p, px)?;
    let norm = checked_sqrt(checked_add(Decimal::ONE, checked_mul(z, z)?)?)?;
    Ok(Vec2 {
        x: checked_div(z, norm)?,
        y: checked_div(Decimal::ONE, norm)?,
    })
}

/// Map a circle-frame vector back into the ellipse frame.
fn from_circle(p: &EclpParams, v: Vec2) -> Result<Vec2, OracleError> {
    let lc = checked_mul(p.lambda, p.c)?;
    let ls = checked_mul(p.lambda, p.s)?;
    Ok(Vec2 {
        x: checked_add(checked_mul(lc, v.x)?, checked_mul(p.s, v.y)?)?,
        y: checked_sub(checked_mul(p.c, v.y)?, checked_mul(ls, v.x)?)?,
    })
}

/// Map ellipse-frame reserves into the circle frame.
fn to_circle(p: &EclpParams, v: Vec2) -> Result<Vec2, OracleError> {
    let rotated_x = checked_sub(checked_mul(p.c, v.x)?, checked_mul(p.s, v.y)?)?;
    Ok(Vec2 {
        x: checked_div(rotated_x, p.lambda)?,
        y: checked_add(checked_mul(p.s, v.x)?, checked_mul(p.c, v.y)?)?,
    })
}

fn dot(a: Vec2, b: Vec2) -> Result<Decimal, OracleError> {
    checked_add(checked_mul(a.x, b.x)?, checked_mul(a.y, b.y)?)
}

/// Virtual offset direction: the circle center sits at `r · chi`.
fn chi(p: &EclpParams) -> Result<Vec2, OracleError> {
    let at_beta = from_circle(p, tau(p, p.beta)?)?;
    let at_alpha = from_circle(p, tau(p, p.alpha)?)?;
    Ok(Vec2 {
        x: at_beta.x,
        y: at_alpha.y,
    })
}

/// Recover the invariant from the current reserves.
///
/// Solves `‖A·z − r·A·chi‖ = r` for `r`, keeping the root on the trading
/// arc (the larger one).
fn invariant(p: &EclpParams, reserves: Vec2) -> Result<Decimal, OracleError> {
    let u = to_circle(p, reserves)?;
    let w = to_circle(p, chi(p)?)?;

    let ww = dot(w, w)?;
    let excess = checked_sub(ww, Decimal::ONE)?;
    if excess <= Decimal::ZERO {
        return Err(OracleError::InvalidPoolState(
            "degenerate curve parameters".to_string(),
        ));
    }

    let uw = dot(u, w)?;
    let uu = dot(u, u)?;
    let disc = checked_sub(checked_mul(uw, uw)?, checked_mul(excess, uu)?)?;
    if disc < Decimal::ZERO {
        return Err(OracleError::InvalidPoolState(
            "reserves are not reachable on the curve".to_string(),
        ));
    }

    let r = checked_div(checked_add(uw, checked_sqrt(disc)?)?, excess)?;
    if r <= Decimal::ZERO {
        return Err(OracleError::InvalidPoolState(
            "non-positive curve invariant".to_string(),
        ));
    }
    Ok(r)
}

/// Fair reserve split at relative price `px` and invariant `r`.
///
/// Pins to a single-asset corner when `px` sits on a price bound.
fn fair_reserves(p: &EclpParams, r: Decimal, px: Decimal) -> Result<Vec2, OracleError> {
    let at_price = tau(p, px)?;
    let at_beta = tau(p, p.beta)?;
    let at_alpha = tau(p, p.alpha)?;

    let x_dir = from_circle(
        p,
        Vec2 {
            x: checked_sub(at_beta.x, at_price.x)?,
            y: checked_sub(at_beta.y, at_price.y)?,
        },
    )?;
    let y_dir = from_circle(
        p,
        Vec2 {
            x: checked_sub(at_alpha.x, at_price.x)?,
            y: checked_sub(at_alpha.y, at_price.y)?,
        },
    )?;

    // Rounding can leave a bound reserve a hair below zero.
    Ok(Vec2 {
        x: checked_mul(r, x_dir.x)?.max(Decimal::ZERO),
        y: checked_mul(r, y_dir.y)?.max(Decimal::ZERO),
    })
}

pub(crate) fn price_usd(
    pool: &NormalizedPool,
    prices_usd: &[Decimal],
    anchor_on_second: bool,
) -> Result<Decimal, OracleError> {
    if pool.assets.len() != 2 {
        return Err(OracleError::InvalidPoolState(format!(
            "concentrated-liquidity pools hold exactly 2 assets, got {}",
            pool.assets.len()
        )));
    }
    let params = match &pool.params {
        NormalizedParams::Eclp(params) => params,
        _ => {
            return Err(OracleError::InvalidPoolState(
                "pool reports no curve parameters".to_string(),
            ))
        }
    };

    // The anchor asset plays the x role of the curve; its price is quoted
    // in units of the other asset.
    let (base, quote) = if anchor_on_second { (1, 0) } else { (0, 1) };
    let relative = checked_div(prices_usd[base], prices_usd[quote])?
        .clamp(params.alpha, params.beta);

    let r = invariant(
        params,
        Vec2 {
            x: pool.reserves[base],
            y: pool.reserves[quote],
        },
    )?;
    let fair = fair_reserves(params, r, relative)?;

    let fair_value = checked_add(
        checked_mul(fair.x, prices_usd[base])?,
        checked_mul(fair.y, prices_usd[quote])?,
    )?;
    checked_div(fair_value, pool.total_supply)
}
