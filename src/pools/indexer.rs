//! Indexer-backed pool snapshot reader.
//!
//! Reads live pool state from a pool-indexer HTTP endpoint. Reserve and
//! supply amounts arrive as decimal strings so that 256-bit on-chain
//! values survive JSON transport.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::IndexerConfig;
use crate::pools::{EclpParams, PoolParams, PoolSnapshot, PoolSource};
use crate::types::Address;

/// One pool token entry in an indexer response.
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolTokenData {
    pub address: String,
    pub reserve: String,
    pub decimals: u32,
    pub weight: Option<Decimal>,
}

/// Elliptic curve parameters in an indexer response.
#[derive(Debug, Serialize, Deserialize)]
pub struct EclpParamsData {
    pub alpha: Decimal,
    pub beta: Decimal,
    pub c: Decimal,
    pub s: Decimal,
    pub lambda: Decimal,
}

/// Indexer pool state response.
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolStateResponse {
    pub tokens: Vec<PoolTokenData>,
    #[serde(rename = "totalSupply")]
    pub total_supply: String,
    #[serde(rename = "supplyDecimals")]
    pub supply_decimals: u32,
    #[serde(rename = "poolType")]
    pub pool_type: String,
    pub eclp: Option<EclpParamsData>,
}

impl PoolStateResponse {
    fn into_snapshot(self) -> Result<PoolSnapshot> {
        let mut underlying = Vec::with_capacity(self.tokens.len());
        let mut reserves = Vec::with_capacity(self.tokens.len());
        let mut token_decimals = Vec::with_capacity(self.tokens.len());
        let mut weights = Vec::with_capacity(self.tokens.len());

        for token in &self.tokens {
            underlying.push(
                Address::parse(&token.address)
                    .map_err(|e| anyhow!("bad token address in indexer response: {e}"))?,
            );
            reserves.push(
                token
                    .reserve
                    .parse::<u128>()
                    .with_context(|| format!("bad reserve amount: {}", token.reserve))?,
            );
            token_decimals.push(token.decimals);
            if let Some(weight) = token.weight {
                weights.push(weight);
            }
        }

        let params = match self.pool_type.as_str() {
            "weighted" => {
                if weights.len() != self.tokens.len() {
                    bail!("weighted pool response is missing per-token weights");
                }
                PoolParams::Weighted { weights }
            }
            "eclp" => {
                let p = self
                    .eclp
                    .ok_or_else(|| anyhow!("eclp pool response is missing curve parameters"))?;
                PoolParams::Eclp(EclpParams {
                    alpha: p.alpha,
                    beta: p.beta,
                    c: p.c,
                    s: p.s,
                    lambda: p.lambda,
                })
            }
            "constant_product" => PoolParams::ConstantProduct,
            other => bail!("unknown pool type in indexer response: {other}"),
        };

        Ok(PoolSnapshot {
            underlying,
            reserves,
            token_decimals,
            total_supply: self
                .total_supply
                .parse::<u128>()
                .with_context(|| format!("bad total supply: {}", self.total_supply))?,
            supply_decimals: self.supply_decimals,
            params,
        })
    }
}

/// Pool source backed by an indexer HTTP endpoint.
pub struct IndexerPoolSource {
    base_url: String,
    client: reqwest::Client,
}

impl IndexerPoolSource {
    pub fn new(config: &IndexerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to build indexer HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl PoolSource for IndexerPoolSource {
    async fn read_pool(&self, lp_token: &Address) -> Result<PoolSnapshot> {
        let url = format!("{}/v1/pools/{}", self.base_url, lp_token.as_str());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Indexer request failed for pool {lp_token}"))?
            .error_for_status()
            .with_context(|| format!("Indexer returned an error status for pool {lp_token}"))?
            .json::<PoolStateResponse>()
            .await
            .context("Failed to decode indexer response body")?;

        let snapshot = response
            .into_snapshot()
            .with_context(|| format!("Invalid indexer response for pool {lp_token}"))?;

        debug!(
            lp_token = %lp_token,
            assets = snapshot.underlying.len(),
            "pool snapshot fetched"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_weighted_response_converts_to_snapshot() {
        let body = serde_json::json!({
            "tokens": [
                {
                    "address": "0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270",
                    "reserve": "250000000000000000000",
                    "decimals": 18,
                    "weight": "0.8"
                },
                {
                    "address": "0x2791bca1f2de4661ed88a30c99a7a9449aa84174",
                    "reserve": "90000000",
                    "decimals": 6,
                    "weight": "0.2"
                }
            ],
            "totalSupply": "1000000000000000000000",
            "supplyDecimals": 18,
            "poolType": "weighted"
        });

        let response: PoolStateResponse = serde_json::from_value(body).unwrap();
        let snapshot = response.into_snapshot().unwrap();
        assert_eq!(snapshot.reserves, vec![250_000_000_000_000_000_000, 90_000_000]);
        assert_eq!(snapshot.token_decimals, vec![18, 6]);
        assert_eq!(
            snapshot.params,
            PoolParams::Weighted {
                weights: vec![dec!(0.8), dec!(0.2)]
            }
        );
    }

    #[test]
    fn test_eclp_response_requires_curve_parameters() {
        let body = serde_json::json!({
            "tokens": [
                { "address": "0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270", "reserve": "1", "decimals": 18 },
                { "address": "0x2791bca1f2de4661ed88a30c99a7a9449aa84174", "reserve": "1", "decimals": 6 }
            ],
            "totalSupply": "100",
            "supplyDecimals": 18,
            "poolType": "eclp"
        });

        let response: PoolStateResponse = serde_json::from_value(body).unwrap();
        assert!(response.into_snapshot().is_err());
    }

    #[test]
    fn test_unknown_pool_type_is_rejected() {
        let body = serde_json::json!({
            "tokens": [
                { "address": "0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270", "reserve": "1", "decimals": 18 },
                { "address": "0x2791bca1f2de4661ed88a30c99a7a9449aa84174", "reserve": "1", "decimals": 6 }
            ],
            "totalSupply": "100",
            "supplyDecimals": 18,
            "poolType": "order_book"
        });

        let response: PoolStateResponse = serde_json::from_value(body).unwrap();
        assert!(response.into_snapshot().is_err());
    }
}
