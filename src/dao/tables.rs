use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    dao::storage::{CoverageStore, StorageResult},
    model::{ClaimLease, MatchId, ScoreRecord},
};

/// Shared in-memory lease and score tables.
///
/// This is the default [`CoverageStore`] implementation: two levels of
/// concurrent maps, scope first, match id second. Reads clone the stored
/// record so callers never hold a map guard across their own logic.
#[derive(Default)]
pub struct MemoryStore {
    leases: DashMap<String, DashMap<MatchId, ClaimLease>>,
    scores: DashMap<String, DashMap<MatchId, ScoreRecord>>,
}

impl MemoryStore {
    /// Build an empty store wrapped in an [`Arc`] so consumers can share it.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl CoverageStore for MemoryStore {
    fn lease(&self, scope: &str, match_id: MatchId) -> StorageResult<Option<ClaimLease>> {
        Ok(self
            .leases
            .get(scope)
            .and_then(|table| table.get(&match_id).map(|entry| entry.value().clone())))
    }

    fn put_lease(&self, lease: ClaimLease) -> StorageResult<()> {
        self.leases
            .entry(lease.scope.clone())
            .or_default()
            .insert(lease.match_id, lease);
        Ok(())
    }

    fn remove_lease(&self, scope: &str, match_id: MatchId) -> StorageResult<Option<ClaimLease>> {
        Ok(self
            .leases
            .get(scope)
            .and_then(|table| table.remove(&match_id).map(|(_, lease)| lease)))
    }

    fn leases(&self, scope: &str) -> StorageResult<Vec<ClaimLease>> {
        Ok(self
            .leases
            .get(scope)
            .map(|table| table.iter().map(|entry| entry.value().clone()).collect())
            .unwrap_or_default())
    }

    fn clear_leases(&self, scope: &str) -> StorageResult<()> {
        if let Some(table) = self.leases.get(scope) {
            table.clear();
        }
        Ok(())
    }

    fn score(&self, scope: &str, match_id: MatchId) -> StorageResult<Option<ScoreRecord>> {
        Ok(self
            .scores
            .get(scope)
            .and_then(|table| table.get(&match_id).map(|entry| entry.value().clone())))
    }

    fn put_score(&self, record: ScoreRecord) -> StorageResult<()> {
        self.scores
            .entry(record.scope.clone())
            .or_default()
            .insert(record.match_id, record);
        Ok(())
    }

    fn scores(&self, scope: &str) -> StorageResult<Vec<ScoreRecord>> {
        Ok(self
            .scores
            .get(scope)
            .map(|table| table.iter().map(|entry| entry.value().clone()).collect())
            .unwrap_or_default())
    }

    fn clear_scores(&self, scope: &str) -> StorageResult<()> {
        if let Some(table) = self.scores.get(scope) {
            table.clear();
        }
        Ok(())
    }
}
