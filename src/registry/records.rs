//! Oracle record table: one record per LP token.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::feeds::FeedReference;
use crate::types::{Address, StrategyId, StrategyKind};

/// Binding of an LP token to a pricing strategy and its feeds.
///
/// `assets`, `token_decimals` and `weights` are the static pool facts
/// captured when the binding was created; reserves and supply are never
/// stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRecord {
    pub lp_token: Address,
    pub strategy_id: StrategyId,
    /// Position `i` prices `assets[i]`.
    pub feeds: Vec<FeedReference>,
    pub variant_flag: bool,
    /// Priced assets (the pool's own token excluded), in pool order.
    pub assets: Vec<Address>,
    pub token_decimals: Vec<u32>,
    pub weights: Option<Vec<Decimal>>,
}

/// Table of oracle records keyed by LP token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordTable {
    records: HashMap<Address, OracleRecord>,
}

impl RecordTable {
    /// Insert a record, replacing any prior binding for the same token.
    ///
    /// Returns the replaced record, if there was one.
    pub fn bind(&mut self, record: OracleRecord) -> Option<OracleRecord> {
        self.records.insert(record.lp_token.clone(), record)
    }

    pub fn get(&self, lp_token: &Address) -> Option<&OracleRecord> {
        self.records.get(lp_token)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read-only projection of an oracle record plus a fresh pool read,
/// returned to callers for introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpTokenInfo {
    pub lp_token: Address,
    pub strategy_id: StrategyId,
    pub kind: StrategyKind,
    pub variant_flag: bool,
    pub feeds: Vec<FeedReference>,
    pub assets: Vec<Address>,
    pub token_decimals: Vec<u32>,
    pub weights: Option<Vec<Decimal>>,
    /// Live reserves at query time, in pool-reported order.
    pub reserves: Vec<u128>,
    /// Live effective supply at query time.
    pub total_supply: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last_byte: u8) -> Address {
        Address::parse(&format!("0x{}{:02x}", "00".repeat(19), last_byte)).unwrap()
    }

    fn record(lp_token: Address, strategy_id: StrategyId) -> OracleRecord {
        OracleRecord {
            lp_token,
            strategy_id,
            feeds: vec![],
            variant_flag: false,
            assets: vec![addr(1), addr(2)],
            token_decimals: vec![18, 6],
            weights: None,
        }
    }

    #[test]
    fn test_rebinding_replaces_the_prior_record() {
        let mut table = RecordTable::default();
        let lp = addr(9);

        assert!(table.bind(record(lp.clone(), StrategyId(0))).is_none());
        let replaced = table.bind(record(lp.clone(), StrategyId(1))).unwrap();

        assert_eq!(replaced.strategy_id, StrategyId(0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&lp).unwrap().strategy_id, StrategyId(1));
    }

    #[test]
    fn test_records_are_keyed_per_token() {
        let mut table = RecordTable::default();
        table.bind(record(addr(8), StrategyId(0)));
        table.bind(record(addr(9), StrategyId(0)));

        // The same strategy id may back many tokens.
        assert_eq!(table.len(), 2);
        assert!(table.get(&addr(7)).is_none());
    }

    #[test]
    fn test_record_table_serde_round_trip() {
        let mut table = RecordTable::default();
        table.bind(record(addr(9), StrategyId(3)));

        let json = serde_json::to_string(&table).unwrap();
        let restored: RecordTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.get(&addr(9)).unwrap().strategy_id, StrategyId(3));
    }
}
