//! Durable registry state.
//!
//! The strategy directory and oracle record table must survive process
//! restarts. State is serialized to a single JSON file and written
//! atomically (temp file + rename), so a crash mid-write leaves the
//! previous state intact.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::RegistryState;
use crate::error::OracleError;

/// JSON-file-backed store for registry state.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted state, or an empty state if the file does not exist.
    pub async fn load(&self) -> Result<RegistryState, OracleError> {
        if !self.path.exists() {
            return Ok(RegistryState::default());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read registry store: {:?}", self.path))
            .map_err(OracleError::Store)?;

        let state: RegistryState = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse registry store: {:?}", self.path))
            .map_err(OracleError::Store)?;

        info!(
            strategies = state.directory.len(),
            records = state.records.len(),
            "registry store loaded"
        );
        Ok(state)
    }

    /// Persist the full state atomically.
    pub async fn save(&self, state: &RegistryState) -> Result<(), OracleError> {
        let content = serde_json::to_string_pretty(state)
            .context("Failed to serialize registry state")
            .map_err(OracleError::Store)?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content)
            .await
            .with_context(|| format!("Failed to write registry store: {tmp:?}"))
            .map_err(OracleError::Store)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to commit registry store: {:?}", self.path))
            .map_err(OracleError::Store)?;

        debug!(path = ?self.path, "registry store saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, StrategyKind};

    fn temp_store(name: &str) -> RecordStore {
        let path = std::env::temp_dir().join(format!(
            "amm-lp-oracle-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        RecordStore::new(path)
    }

    fn addr(last_byte: u8) -> Address {
        Address::parse(&format!("0x{}{:02x}", "00".repeat(19), last_byte)).unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty_state() {
        let store = temp_store("missing");
        let state = store.load().await.unwrap();
        assert!(state.directory.is_empty());
        assert!(state.records.is_empty());
    }

    #[tokio::test]
    async fn test_state_round_trips_through_disk() {
        let store = temp_store("round-trip");

        let mut state = RegistryState::default();
        state
            .directory
            .register(addr(1), StrategyKind::ConstantProduct)
            .unwrap();
        store.save(&state).await.unwrap();

        let restored = store.load().await.unwrap();
        assert_eq!(restored.directory.len(), 1);
        assert_eq!(
            restored.directory.entries()[0].kind,
            StrategyKind::ConstantProduct
        );

        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn test_corrupt_file_surfaces_a_store_error() {
        let store = temp_store("corrupt");
        std::fs::write(store.path(), "not json").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, OracleError::Store(_)));

        let _ = std::fs::remove_file(store.path());
    }
}
