use std::error::Error;
use thiserror::Error;

use crate::model::{ClaimLease, MatchId, ScoreRecord};

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Abstraction over the shared lease and score tables.
///
/// One instance of the store is shared by every consumer of the same event;
/// tables are partitioned by scope so unrelated events never interact. The
/// store provides plain get/put semantics only: it offers no transactions and
/// no atomic read-modify-write, which is why lease exclusivity on top of it is
/// advisory rather than guaranteed.
pub trait CoverageStore: Send + Sync {
    /// Fetch the lease record for a match, expired or not.
    fn lease(&self, scope: &str, match_id: MatchId) -> StorageResult<Option<ClaimLease>>;
    /// Insert or replace the lease record for its `(scope, match_id)` key.
    fn put_lease(&self, lease: ClaimLease) -> StorageResult<()>;
    /// Remove and return the lease record for a match.
    fn remove_lease(&self, scope: &str, match_id: MatchId) -> StorageResult<Option<ClaimLease>>;
    /// All lease records in a scope, expired ones included.
    fn leases(&self, scope: &str) -> StorageResult<Vec<ClaimLease>>;
    /// Drop every lease record in a scope.
    fn clear_leases(&self, scope: &str) -> StorageResult<()>;

    /// Fetch the score record for a match.
    fn score(&self, scope: &str, match_id: MatchId) -> StorageResult<Option<ScoreRecord>>;
    /// Insert or replace the score record for its `(scope, match_id)` key.
    fn put_score(&self, record: ScoreRecord) -> StorageResult<()>;
    /// All score records in a scope.
    fn scores(&self, scope: &str) -> StorageResult<Vec<ScoreRecord>>;
    /// Drop every score record in a scope.
    fn clear_scores(&self, scope: &str) -> StorageResult<()>;
}
