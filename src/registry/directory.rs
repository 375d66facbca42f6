//! Strategy directory: id assignment for pricing strategy implementations.

use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::types::{Address, StrategyId, StrategyKind};

/// One registered pricing strategy implementation.
///
/// Immutable once created; the id is never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRecord {
    pub id: StrategyId,
    pub implementation: Address,
    pub kind: StrategyKind,
}

/// Append-only table of registered strategies.
///
/// Ids are positions in the table: sequential from 0, strictly
/// increasing, never reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyDirectory {
    entries: Vec<StrategyRecord>,
}

impl StrategyDirectory {
    /// Register an implementation and assign it the next id.
    ///
    /// An implementation address may be registered at most once.
    pub fn register(
        &mut self,
        implementation: Address,
        kind: StrategyKind,
    ) -> Result<StrategyId, OracleError> {
        if self
            .entries
            .iter()
            .any(|entry| entry.implementation == implementation)
        {
            return Err(OracleError::DuplicateImplementation(implementation));
        }

        let id = StrategyId(self.entries.len() as u32);
        self.entries.push(StrategyRecord {
            id,
            implementation,
            kind,
        });
        Ok(id)
    }

    pub fn get(&self, id: StrategyId) -> Option<&StrategyRecord> {
        self.entries.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[StrategyRecord] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last_byte: u8) -> Address {
        Address::parse(&format!("0x{}{:02x}", "00".repeat(19), last_byte)).unwrap()
    }

    #[test]
    fn test_ids_are_sequential_from_zero() {
        let mut directory = StrategyDirectory::default();
        let a = directory.register(addr(1), StrategyKind::Weighted).unwrap();
        let b = directory
            .register(addr(2), StrategyKind::ConstantProduct)
            .unwrap();
        let c = directory
            .register(addr(3), StrategyKind::ConcentratedLiquidity)
            .unwrap();

        assert_eq!((a, b, c), (StrategyId(0), StrategyId(1), StrategyId(2)));
        assert_eq!(directory.get(b).unwrap().kind, StrategyKind::ConstantProduct);
    }

    #[test]
    fn test_duplicate_implementation_is_rejected() {
        let mut directory = StrategyDirectory::default();
        directory.register(addr(1), StrategyKind::Weighted).unwrap();

        let err = directory
            .register(addr(1), StrategyKind::Weighted)
            .unwrap_err();
        assert!(matches!(err, OracleError::DuplicateImplementation(_)));
        // The failed call must not burn an id.
        assert_eq!(
            directory.register(addr(2), StrategyKind::Weighted).unwrap(),
            StrategyId(1)
        );
    }

    #[test]
    fn test_unknown_id_lookup() {
        let directory = StrategyDirectory::default();
        assert!(directory.get(StrategyId(0)).is_none());
    }
}
