//! Pool snapshot reading and validation.
//!
//! A [`PoolSnapshot`] is the raw, pool-reported view of reserves, supply
//! and invariant parameters. It is read fresh on every price query and
//! never cached across queries. [`PoolSnapshot::normalize`] turns it into
//! the validated, decimal-scaled [`NormalizedPool`] the pricing strategies
//! consume, dropping the pool's own token where composable pools list
//! themselves as a pseudo-underlying.

pub mod indexer;

pub use indexer::IndexerPoolSource;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::math;
use crate::types::Address;

/// Invariant parameters reported by the pool, by pool family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PoolParams {
    /// Normalized token weights, aligned with the snapshot's asset order.
    Weighted { weights: Vec<Decimal> },
    /// Elliptic concentrated-liquidity curve parameters.
    Eclp(EclpParams),
    /// No parameters beyond reserves; the invariant is `x · y`.
    ConstantProduct,
}

/// Curve parameters of an elliptic concentrated-liquidity pool.
///
/// `alpha` and `beta` bound the relative price of asset 0 in asset 1;
/// `c` and `s` are the cosine and sine of the ellipse rotation, and
/// `lambda` is the stretch along the rotated axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EclpParams {
    pub alpha: Decimal,
    pub beta: Decimal,
    pub c: Decimal,
    pub s: Decimal,
    pub lambda: Decimal,
}

impl EclpParams {
    /// Tolerance for the `c² + s² = 1` rotation constraint.
    const ROTATION_TOLERANCE: Decimal = dec!(0.00000001);

    /// Largest stretch that keeps the curve solve inside 96-bit decimals.
    const MAX_LAMBDA: Decimal = dec!(100000000);

    fn validate(&self) -> Result<(), OracleError> {
        if self.alpha <= Decimal::ZERO || self.beta <= self.alpha {
            return Err(OracleError::InvalidPoolState(format!(
                "invalid price bounds: alpha={} beta={}",
                self.alpha, self.beta
            )));
        }
        if self.lambda < Decimal::ONE || self.lambda > Self::MAX_LAMBDA {
            return Err(OracleError::InvalidPoolState(format!(
                "invalid curve stretch: lambda={}",
                self.lambda
            )));
        }
        if self.c <= Decimal::ZERO || self.s < Decimal::ZERO {
            return Err(OracleError::InvalidPoolState(format!(
                "invalid rotation: c={} s={}",
                self.c, self.s
            )));
        }
        let norm = self.c * self.c + self.s * self.s;
        if (norm - Decimal::ONE).abs() > Self::ROTATION_TOLERANCE {
            return Err(OracleError::InvalidPoolState(format!(
                "rotation is not normalized: c^2 + s^2 = {norm}"
            )));
        }
        Ok(())
    }
}

/// Raw pool state as reported by the pool program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Ordered asset list exactly as the pool reports it. Composable pools
    /// may include the pool's own token here.
    pub underlying: Vec<Address>,
    /// Raw reserve amounts, aligned with `underlying`.
    pub reserves: Vec<u128>,
    /// Decimal precision of each underlying token.
    pub token_decimals: Vec<u32>,
    /// Effective (circulating) LP token supply.
    pub total_supply: u128,
    /// Decimal precision of the LP token.
    pub supply_decimals: u32,
    /// Pool-family invariant parameters.
    pub params: PoolParams,
}

/// Read-only access to live pool state.
///
/// Implementations take `&self` and must not touch registry state; a pool
/// read can abort a query but can never mutate it.
#[async_trait]
pub trait PoolSource: Send + Sync {
    /// Current snapshot of the pool behind `lp_token`.
    async fn read_pool(&self, lp_token: &Address) -> anyhow::Result<PoolSnapshot>;
}

/// Validated, decimal-scaled pool state with the pool's own token removed.
///
/// `reserves`, `weights` and `assets` are aligned; weights are renormalized
/// to sum to one over the remaining positions.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPool {
    pub assets: Vec<Address>,
    pub reserves: Vec<Decimal>,
    pub token_decimals: Vec<u32>,
    pub total_supply: Decimal,
    pub params: NormalizedParams,
}

/// Invariant parameters after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedParams {
    Weighted { weights: Vec<Decimal> },
    Eclp(EclpParams),
    ConstantProduct,
}

impl PoolSnapshot {
    /// Validate the snapshot and project it onto the priced assets.
    pub fn normalize(&self, lp_token: &Address) -> Result<NormalizedPool, OracleError> {
        let n = self.underlying.len();
        if n == 0 || self.reserves.len() != n || self.token_decimals.len() != n {
            return Err(OracleError::InvalidPoolState(format!(
                "mismatched snapshot vectors: {} assets, {} reserves, {} decimals",
                n,
                self.reserves.len(),
                self.token_decimals.len()
            )));
        }
        if self.total_supply == 0 {
            return Err(OracleError::InvalidPoolState(
                "zero total supply".to_string(),
            ));
        }

        let kept: Vec<usize> = (0..n)
            .filter(|&i| self.underlying[i] != *lp_token)
            .collect();
        if kept.len() < 2 {
            return Err(OracleError::InvalidPoolState(format!(
                "pool reports {} priced assets, need at least 2",
                kept.len()
            )));
        }

        let mut assets = Vec::with_capacity(kept.len());
        let mut reserves = Vec::with_capacity(kept.len());
        let mut token_decimals = Vec::with_capacity(kept.len());
        for &i in &kept {
            if self.reserves[i] == 0 {
                return Err(OracleError::InvalidPoolState(format!(
                    "zero reserve for asset {}",
                    self.underlying[i]
                )));
            }
            assets.push(self.underlying[i].clone());
            reserves.push(math::scale_down(self.reserves[i], self.token_decimals[i])?);
            token_decimals.push(self.token_decimals[i]);
        }

        let params = match &self.params {
            PoolParams::Weighted { weights } => {
                if weights.len() != n {
                    return Err(OracleError::InvalidPoolState(format!(
                        "pool reports {} weights for {} assets",
                        weights.len(),
                        n
                    )));
                }
                let mut total = Decimal::ZERO;
                let mut kept_weights = Vec::with_capacity(kept.len());
                for &i in &kept {
                    if weights[i] <= Decimal::ZERO {
                        return Err(OracleError::InvalidPoolState(format!(
                            "non-positive weight for asset {}",
                            self.underlying[i]
                        )));
                    }
                    kept_weights.push(weights[i]);
                    total += weights[i];
                }
                for w in &mut kept_weights {
                    *w = math::checked_div(*w, total)?;
                }
                NormalizedParams::Weighted {
                    weights: kept_weights,
                }
            }
            PoolParams::Eclp(params) => {
                params.validate()?;
                NormalizedParams::Eclp(*params)
            }
            PoolParams::ConstantProduct => NormalizedParams::ConstantProduct,
        };

        Ok(NormalizedPool {
            assets,
            reserves,
            token_decimals,
            total_supply: math::scale_down(self.total_supply, self.supply_decimals)?,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last_byte: u8) -> Address {
        Address::parse(&format!("0x{}{:02x}", "00".repeat(19), last_byte)).unwrap()
    }

    fn two_asset_snapshot() -> PoolSnapshot {
        PoolSnapshot {
            underlying: vec![addr(1), addr(2)],
            reserves: vec![1_000_000_000, 4_000_000_000_000_000_000_000],
            token_decimals: vec![6, 18],
            total_supply: 1_000_000_000_000_000_000_000,
            supply_decimals: 18,
            params: PoolParams::ConstantProduct,
        }
    }

    #[test]
    fn test_normalize_scales_reserves_and_supply() {
        let lp = addr(9);
        let pool = two_asset_snapshot().normalize(&lp).unwrap();
        assert_eq!(pool.reserves, vec![dec!(1000), dec!(4000)]);
        assert_eq!(pool.total_supply, dec!(1000));
        assert_eq!(pool.assets.len(), 2);
    }

    #[test]
    fn test_normalize_drops_own_token_and_renormalizes_weights() {
        let lp = addr(3);
        let snapshot = PoolSnapshot {
            underlying: vec![addr(1), addr(2), addr(3)],
            reserves: vec![100, 200, 999],
            token_decimals: vec![0, 0, 0],
            total_supply: 50,
            supply_decimals: 0,
            params: PoolParams::Weighted {
                weights: vec![dec!(0.4), dec!(0.4), dec!(0.2)],
            },
        };

        let pool = snapshot.normalize(&lp).unwrap();
        assert_eq!(pool.assets, vec![addr(1), addr(2)]);
        assert_eq!(pool.reserves, vec![dec!(100), dec!(200)]);
        match pool.params {
            NormalizedParams::Weighted { weights } => {
                assert_eq!(weights, vec![dec!(0.5), dec!(0.5)]);
            }
            other => panic!("expected weighted params, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_rejects_zero_reserves_and_supply() {
        let lp = addr(9);

        let mut snapshot = two_asset_snapshot();
        snapshot.reserves[1] = 0;
        assert!(matches!(
            snapshot.normalize(&lp),
            Err(OracleError::InvalidPoolState(_))
        ));

        let mut snapshot = two_asset_snapshot();
        snapshot.total_supply = 0;
        assert!(matches!(
            snapshot.normalize(&lp),
            Err(OracleError::InvalidPoolState(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_mismatched_vectors() {
        let lp = addr(9);
        let mut snapshot = two_asset_snapshot();
        snapshot.token_decimals.pop();
        assert!(matches!(
            snapshot.normalize(&lp),
            Err(OracleError::InvalidPoolState(_))
        ));
    }

    #[test]
    fn test_eclp_params_validation() {
        let valid = EclpParams {
            alpha: dec!(0.5),
            beta: dec!(2),
            c: dec!(1),
            s: dec!(0),
            lambda: dec!(1),
        };
        assert!(valid.validate().is_ok());

        let mut bad = valid;
        bad.beta = dec!(0.4);
        assert!(bad.validate().is_err());

        let mut bad = valid;
        bad.lambda = dec!(0.5);
        assert!(bad.validate().is_err());

        let mut bad = valid;
        bad.c = dec!(0.9);
        bad.s = dec!(0.9);
        assert!(bad.validate().is_err());
    }
}
