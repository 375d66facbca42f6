//! AMM LP-Token Price Oracle Registry
//!
//! This library values AMM liquidity-pool tokens in USD for collateral
//! systems that cannot afford a manipulable price:
//!
//! - A registry maps each LP token to a pricing strategy and an ordered
//!   list of external price feeds
//! - Three strategy families cover weighted/composable-stable pools,
//!   elliptic concentrated-liquidity pools, and constant-product pools
//! - Every valuation is derived from the pool invariant at the
//!   feed-implied equilibrium, so a single-block reserve skew cannot move
//!   the answer
//! - Pool snapshots and feed prices are fetched fresh on every query
//!   through read-only collaborator traits

pub mod config;
pub mod error;
pub mod feeds;
pub mod math;
pub mod pools;
pub mod registry;
pub mod strategies;
pub mod telemetry;
pub mod types;

// Re-export main types
pub use config::OracleConfig;
pub use error::OracleError;
pub use feeds::{FeedReference, HermesFeedSource, PriceFeedSource};
pub use pools::{
    EclpParams, IndexerPoolSource, NormalizedPool, PoolParams, PoolSnapshot, PoolSource,
};
pub use registry::{
    LpTokenInfo, OracleRecord, OracleRegistry, RecordStore, RegistryState, StrategyRecord,
};
pub use types::{Address, PriceSample, StrategyId, StrategyKind};
