//! Configuration module
//!
//! Handles loading and validation of the oracle configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// Top-level oracle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    pub staleness: StalenessConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub telemetry: TelemetryConfig,
    pub sources: SourcesConfig,
}

/// Feed staleness bound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalenessConfig {
    /// Maximum tolerated age of a feed price, in seconds
    pub max_feed_age_secs: i64,
}

/// Durable state location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the registry state file; in-memory only when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
}

/// External data source endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub hermes: HermesConfig,
    pub indexer: IndexerConfig,
}

/// Hermes price feed endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HermesConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

/// Pool indexer endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl OracleConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| "Failed to parse config file")?;

        config.validate()?;
        info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.staleness.max_feed_age_secs > 0,
            "max_feed_age_secs must be positive"
        );
        anyhow::ensure!(
            self.sources.hermes.request_timeout_ms > 0,
            "hermes request_timeout_ms must be positive"
        );
        anyhow::ensure!(
            self.sources.indexer.request_timeout_ms > 0,
            "indexer request_timeout_ms must be positive"
        );
        Url::parse(&self.sources.hermes.base_url)
            .with_context(|| format!("invalid hermes base_url: {}", self.sources.hermes.base_url))?;
        Url::parse(&self.sources.indexer.base_url).with_context(|| {
            format!("invalid indexer base_url: {}", self.sources.indexer.base_url)
        })?;
        Ok(())
    }

    /// Create a default config for testing
    #[cfg(test)]
    pub fn default_for_test() -> Self {
        Self {
            staleness: StalenessConfig {
                max_feed_age_secs: 3600,
            },
            store: StoreConfig { path: None },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            sources: SourcesConfig {
                hermes: HermesConfig {
                    base_url: "https://hermes.pyth.network".to_string(),
                    request_timeout_ms: 10_000,
                },
                indexer: IndexerConfig {
                    base_url: "https://pools.example.com".to_string(),
                    request_timeout_ms: 10_000,
                },
            },
        }
    }
}
