//! Hermes price feed adapter.
//!
//! Resolves [`FeedReference`](super::FeedReference) sources against a
//! Pyth-Hermes-style HTTP endpoint. Answers are normalized to 18 decimals,
//! so references backed by this source declare `decimals: 18`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use crate::config::HermesConfig;
use crate::feeds::PriceFeedSource;
use crate::types::{Address, PriceSample};

/// Scale of the answers this adapter produces.
pub const HERMES_ANSWER_DECIMALS: u32 = 18;

/// Price feed source backed by a Hermes HTTP endpoint.
pub struct HermesFeedSource {
    base_url: String,
    client: reqwest::Client,
}

impl HermesFeedSource {
    pub fn new(config: &HermesConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to build Hermes HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Parse the first entry of a `latest_price_feeds` response.
    fn parse_latest(body: &serde_json::Value) -> Result<PriceSample> {
        let feed = body
            .as_array()
            .and_then(|feeds| feeds.first())
            .ok_or_else(|| anyhow!("empty Hermes response"))?;

        let price_obj = feed
            .get("price")
            .ok_or_else(|| anyhow!("Hermes response missing price object"))?;

        let mantissa: i128 = price_obj
            .get("price")
            .and_then(|p| p.as_str())
            .ok_or_else(|| anyhow!("Hermes response missing price mantissa"))?
            .parse()
            .context("Failed to parse Hermes price mantissa")?;

        let expo = price_obj
            .get("expo")
            .and_then(|e| e.as_i64())
            .ok_or_else(|| anyhow!("Hermes response missing price exponent"))?;

        let publish_time = price_obj
            .get("publish_time")
            .and_then(|t| t.as_i64())
            .ok_or_else(|| anyhow!("Hermes response missing publish time"))?;

        let answer = rescale(mantissa, expo)?;
        let updated_at: DateTime<Utc> = DateTime::from_timestamp(publish_time, 0)
            .ok_or_else(|| anyhow!("Hermes publish time out of range: {publish_time}"))?;

        Ok(PriceSample { answer, updated_at })
    }
}

/// Shift a `mantissa * 10^expo` answer onto the fixed 18-decimal scale.
fn rescale(mantissa: i128, expo: i64) -> Result<i128> {
    let shift = i64::from(HERMES_ANSWER_DECIMALS) + expo;
    if shift >= 0 {
        let factor = 10i128
            .checked_pow(u32::try_from(shift).context("exponent out of range")?)
            .ok_or_else(|| anyhow!("price exponent out of range: {expo}"))?;
        mantissa
            .checked_mul(factor)
            .ok_or_else(|| anyhow!("price mantissa overflow"))
    } else {
        let factor = 10i128
            .checked_pow(u32::try_from(-shift).context("exponent out of range")?)
            .ok_or_else(|| anyhow!("price exponent out of range: {expo}"))?;
        Ok(mantissa / factor)
    }
}

#[async_trait]
impl PriceFeedSource for HermesFeedSource {
    async fn latest_price(&self, feed: &Address) -> Result<PriceSample> {
        let url = format!(
            "{}/api/latest_price_feeds?ids[]={}",
            self.base_url,
            feed.as_str()
        );

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Hermes request failed for feed {feed}"))?
            .error_for_status()
            .with_context(|| format!("Hermes returned an error status for feed {feed}"))?
            .json::<serde_json::Value>()
            .await
            .context("Failed to decode Hermes response body")?;

        let sample = Self::parse_latest(&body)
            .with_context(|| format!("Failed to parse Hermes response for feed {feed}"))?;

        debug!(feed = %feed, answer = sample.answer, "Hermes price fetched");
        Ok(sample)
    }
}
