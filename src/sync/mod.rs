//! Score propagation between consumers: broadcast bus plus reconciliation.

/// Broadcast hub fanning score updates out to live consumers.
pub mod bus;
/// Background subscriber and polling tasks.
pub mod reconcile;

use serde::{Deserialize, Serialize};

pub use bus::SyncHub;

use crate::model::{MatchId, ScoreRecord};

/// Ephemeral message published on the sync bus after every score write.
///
/// Carries no persistence guarantee: delivery is at-most-once to currently
/// subscribed consumers, and anyone who misses it catches up through the
/// polling path. Consumers receive events for every scope on the bus and must
/// discard the ones that are not theirs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Event scope the record belongs to.
    pub scope: String,
    /// Match the record covers.
    pub match_id: MatchId,
    /// Full score record; the whole record replaces the local one on merge.
    pub record: ScoreRecord,
}
