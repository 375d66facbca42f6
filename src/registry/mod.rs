//! Oracle registry: the facade over strategies, records and collaborators.
//!
//! The registry maps LP tokens to pricing strategies and feed lists, and
//! answers price queries by combining a fresh pool snapshot with fresh
//! feed reads. Mutations (`register_strategy`, `bind_oracle`) are
//! serialized and commit all-or-nothing, including the durable store
//! write; queries are pure reads over current state plus live external
//! data and never hold a lock across an external call.

pub mod directory;
pub mod records;
pub mod store;

pub use directory::{StrategyDirectory, StrategyRecord};
pub use records::{LpTokenInfo, OracleRecord, RecordTable};
pub use store::RecordStore;

use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::feeds::{self, FeedReference, PriceFeedSource};
use crate::pools::{NormalizedParams, PoolSource};
use crate::strategies;
use crate::types::{Address, StrategyId, StrategyKind};

/// The registry's full mutable state. This is also the unit of
/// persistence: the store serializes it verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryState {
    pub directory: StrategyDirectory,
    pub records: RecordTable,
}

/// Registry of pluggable LP-token pricing strategies.
pub struct OracleRegistry {
    state: RwLock<RegistryState>,
    /// Serializes mutations; readers are never blocked by it.
    mutations: Mutex<()>,
    pools: Arc<dyn PoolSource>,
    feeds: Arc<dyn PriceFeedSource>,
    store: Option<RecordStore>,
    max_feed_age_secs: i64,
}

impl OracleRegistry {
    /// Build an in-memory registry with no durable store.
    pub fn new(
        pools: Arc<dyn PoolSource>,
        feeds: Arc<dyn PriceFeedSource>,
        max_feed_age_secs: i64,
    ) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            mutations: Mutex::new(()),
            pools,
            feeds,
            store: None,
            max_feed_age_secs,
        }
    }

    /// Open a registry from configuration, loading any persisted state.
    pub async fn open(
        config: &OracleConfig,
        pools: Arc<dyn PoolSource>,
        feeds: Arc<dyn PriceFeedSource>,
    ) -> Result<Self, OracleError> {
        let store = config.store.path.as_ref().map(RecordStore::new);
        let state = match &store {
            Some(store) => store.load().await?,
            None => RegistryState::default(),
        };

        Ok(Self {
            state: RwLock::new(state),
            mutations: Mutex::new(()),
            pools,
            feeds,
            store,
            max_feed_age_secs: config.staleness.max_feed_age_secs,
        })
    }

    /// Register a pricing strategy implementation and assign it an id.
    pub async fn register_strategy(
        &self,
        implementation: Address,
        kind: StrategyKind,
    ) -> Result<StrategyId, OracleError> {
        let _guard = self.mutations.lock().await;

        let mut next = self.state.read().clone();
        let id = next.directory.register(implementation.clone(), kind)?;
        self.persist(&next).await?;
        *self.state.write() = next;

        info!(%implementation, %kind, %id, "strategy registered");
        Ok(id)
    }

    /// Bind an LP token to a registered strategy and an ordered feed list.
    ///
    /// Reads the pool once to validate the feed count against the pool's
    /// priced assets and to capture static metadata. Rebinding a token
    /// replaces its record atomically.
    pub async fn bind_oracle(
        &self,
        strategy_id: StrategyId,
        lp_token: Address,
        feed_refs: Vec<FeedReference>,
        variant_flag: bool,
    ) -> Result<(), OracleError> {
        let kind = self
            .state
            .read()
            .directory
            .get(strategy_id)
            .map(|record| record.kind)
            .ok_or(OracleError::UnknownStrategy(strategy_id))?;
        if variant_flag && kind == StrategyKind::ConstantProduct {
            return Err(OracleError::UnsupportedVariant { kind });
        }

        let snapshot = self
            .pools
            .read_pool(&lp_token)
            .await
            .map_err(OracleError::PoolRead)?;
        let pool = snapshot.normalize(&lp_token)?;

        if feed_refs.len() != pool.assets.len() {
            return Err(OracleError::FeedCountMismatch {
                expected: pool.assets.len(),
                actual: feed_refs.len(),
            });
        }
        if matches!(
            kind,
            StrategyKind::ConcentratedLiquidity | StrategyKind::ConstantProduct
        ) && pool.assets.len() != 2
        {
            return Err(OracleError::InvalidPoolState(format!(
                "{kind} pools hold exactly 2 assets, got {}",
                pool.assets.len()
            )));
        }

        let weights = match &pool.params {
            NormalizedParams::Weighted { weights } => Some(weights.clone()),
            _ => None,
        };
        let record = OracleRecord {
            lp_token: lp_token.clone(),
            strategy_id,
            feeds: feed_refs,
            variant_flag,
            assets: pool.assets,
            token_decimals: pool.token_decimals,
            weights,
        };

        let _guard = self.mutations.lock().await;

        let mut next = self.state.read().clone();
        let replaced = next.records.bind(record);
        self.persist(&next).await?;
        *self.state.write() = next;

        info!(
            %lp_token,
            %strategy_id,
            replaced = replaced.is_some(),
            "oracle bound"
        );
        Ok(())
    }

    /// Introspect a binding: its record plus a fresh pool read.
    pub async fn get_lp_token_info(
        &self,
        lp_token: &Address,
    ) -> Result<LpTokenInfo, OracleError> {
        let (record, kind) = self.bound_record(lp_token)?;

        let snapshot = self
            .pools
            .read_pool(lp_token)
            .await
            .map_err(OracleError::PoolRead)?;

        Ok(LpTokenInfo {
            lp_token: record.lp_token,
            strategy_id: record.strategy_id,
            kind,
            variant_flag: record.variant_flag,
            feeds: record.feeds,
            assets: record.assets,
            token_decimals: record.token_decimals,
            weights: record.weights,
            reserves: snapshot.reserves,
            total_supply: snapshot.total_supply,
        })
    }

    /// USD price of one LP token, 18-decimal fixed point.
    ///
    /// Pure function of current registry state, the live pool snapshot
    /// and the live feed prices; any failed precondition aborts the whole
    /// query.
    pub async fn get_lp_token_price_usd(
        &self,
        lp_token: &Address,
    ) -> Result<Decimal, OracleError> {
        let (record, kind) = self.bound_record(lp_token)?;

        let snapshot = self
            .pools
            .read_pool(lp_token)
            .await
            .map_err(OracleError::PoolRead)?;
        let pool = snapshot.normalize(lp_token)?;

        // The pool's shape may have drifted since binding.
        if record.feeds.len() != pool.assets.len() {
            return Err(OracleError::FeedCountMismatch {
                expected: pool.assets.len(),
                actual: record.feeds.len(),
            });
        }

        let now = Utc::now();
        let mut prices_usd = Vec::with_capacity(record.feeds.len());
        for feed in &record.feeds {
            let sample = self
                .feeds
                .latest_price(&feed.source)
                .await
                .map_err(OracleError::FeedRead)?;
            prices_usd.push(feeds::checked_usd_price(
                feed,
                &sample,
                now,
                self.max_feed_age_secs,
            )?);
        }

        let price = strategies::compute_price_usd(kind, &pool, &prices_usd, record.variant_flag)?;
        debug!(%lp_token, %price, "lp token priced");
        Ok(price)
    }

    /// Clone the record and resolve its strategy kind under one read lock.
    fn bound_record(
        &self,
        lp_token: &Address,
    ) -> Result<(OracleRecord, StrategyKind), OracleError> {
        let state = self.state.read();
        let record = state
            .records
            .get(lp_token)
            .cloned()
            .ok_or_else(|| OracleError::UnboundToken(lp_token.clone()))?;
        let kind = state
            .directory
            .get(record.strategy_id)
            .map(|entry| entry.kind)
            .ok_or(OracleError::UnknownStrategy(record.strategy_id))?;
        Ok((record, kind))
    }

    async fn persist(&self, state: &RegistryState) -> Result<(), OracleError> {
        if let Some(store) = &self.store {
            store.save(state).await?;
        }
        Ok(())
    }
}
