use serde::{Deserialize, Serialize};

use crate::model::EpochMs;

/// Unique identifier of a scheduled match.
pub type MatchId = u64;

/// Identifier of the court a match is played on.
pub type CourtId = u32;

/// A scheduled match as delivered by the tournament-data client.
///
/// Instances are read-only inputs: the core never mutates them and refreshes
/// the whole list wholesale when the caller fetches a new schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtMatch {
    /// Unique identifier of the match.
    pub match_id: MatchId,
    /// Court the match is assigned to.
    pub court_id: CourtId,
    /// Scheduled start of the match window.
    pub scheduled_start: EpochMs,
    /// Scheduled end of the match window (`scheduled_start < scheduled_end`).
    pub scheduled_end: EpochMs,
    /// Identifier of the first team.
    pub team1: String,
    /// Identifier of the second team.
    pub team2: String,
}

impl CourtMatch {
    /// Whether this match temporally overlaps `other`.
    ///
    /// The comparison is strict on both ends: back-to-back matches sharing a
    /// boundary instant do not overlap.
    pub fn overlaps(&self, other: &CourtMatch) -> bool {
        self.scheduled_start < other.scheduled_end && self.scheduled_end > other.scheduled_start
    }
}
