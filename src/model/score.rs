use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::{EpochMs, MatchId};

/// Timestamp value marking a set as still in progress.
pub const SET_OPEN: EpochMs = 0;

/// Score of a single set within a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetScore {
    /// 1-based set number; volleyball matches never go past five sets.
    #[validate(range(min = 1, max = 5))]
    pub set_number: u8,
    /// Points scored by the first team.
    pub team1_points: u16,
    /// Points scored by the second team.
    pub team2_points: u16,
    /// When the set finished, or [`SET_OPEN`] while it is still being played.
    pub completed_at: EpochMs,
}

impl SetScore {
    /// Whether this set is still being played.
    pub fn is_open(&self) -> bool {
        self.completed_at == SET_OPEN
    }
}

/// Lifecycle status of a match from the score writer's perspective.
///
/// A single writer only moves the status forward, but records from racing
/// writers are merged last-writer-wins, so the stored status is whatever the
/// winning record carried and is not guaranteed monotonic globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    /// No points have been recorded yet.
    NotStarted,
    /// The match is currently being played.
    InProgress,
    /// The match has finished.
    Completed,
}

/// Live score record for one match, as stored in the shared table and carried
/// on the sync bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Match the record belongs to.
    pub match_id: MatchId,
    /// Event scope the record belongs to.
    pub scope: String,
    /// Set-by-set scores; at most one open set, always the last element.
    pub sets: Vec<SetScore>,
    /// Writer-reported match status.
    pub status: MatchStatus,
    /// Logical timestamp, monotonically non-decreasing per match.
    pub last_updated: EpochMs,
    /// Opaque identifier of the writer that produced this record.
    pub last_updated_by: String,
}
