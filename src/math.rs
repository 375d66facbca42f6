//! Checked fixed-point arithmetic shared by the pricing strategies.
//!
//! All helpers return [`OracleError`] instead of panicking or saturating:
//! an overflow during pricing must abort the whole query.

use rust_decimal::{Decimal, MathematicalOps};

use crate::error::OracleError;

/// Number of decimal places in a final USD price.
pub const USD_SCALE: u32 = 18;

/// Convert a raw integer token amount to a decimal using the token's
/// declared decimals.
pub fn scale_down(raw: u128, decimals: u32) -> Result<Decimal, OracleError> {
    let signed = i128::try_from(raw).map_err(|_| OracleError::Overflow("scale_down"))?;
    Decimal::try_from_i128_with_scale(signed, decimals)
        .map_err(|_| OracleError::Overflow("scale_down"))
}

pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, OracleError> {
    a.checked_add(b).ok_or(OracleError::Overflow("add"))
}

pub fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal, OracleError> {
    a.checked_sub(b).ok_or(OracleError::Overflow("sub"))
}

pub fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, OracleError> {
    a.checked_mul(b).ok_or(OracleError::Overflow("mul"))
}

pub fn checked_div(a: Decimal, b: Decimal) -> Result<Decimal, OracleError> {
    a.checked_div(b).ok_or(OracleError::Overflow("div"))
}

pub fn checked_sqrt(value: Decimal) -> Result<Decimal, OracleError> {
    if value.is_sign_negative() {
        return Err(OracleError::Overflow("sqrt"));
    }
    value.sqrt().ok_or(OracleError::Overflow("sqrt"))
}

/// `base^exp` for a strictly positive base and a decimal exponent.
pub fn checked_pow(base: Decimal, exp: Decimal) -> Result<Decimal, OracleError> {
    if base <= Decimal::ZERO {
        return Err(OracleError::Overflow("pow"));
    }
    base.checked_powd(exp).ok_or(OracleError::Overflow("pow"))
}
