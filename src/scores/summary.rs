//! Read-side derivation of set wins and match summaries.

use serde::Serialize;

use crate::model::{MatchStatus, ScoreRecord, SetScore};

/// Side of a match, in schedule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    /// The first team of the match.
    Team1,
    /// The second team of the match.
    Team2,
}

/// Derived per-match summary for panels and exporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    /// Number of finished sets.
    pub completed_sets: usize,
    /// Completed sets won by the first team.
    pub team1_sets: u8,
    /// Completed sets won by the second team.
    pub team2_sets: u8,
    /// Set number currently being played, when one is.
    pub current_set: Option<u8>,
}

/// Derive the summary for a score record.
pub fn summarize(record: &ScoreRecord) -> ScoreSummary {
    let mut team1_sets = 0u8;
    let mut team2_sets = 0u8;
    let mut completed_sets = 0usize;

    for set in record.sets.iter().filter(|set| !set.is_open()) {
        completed_sets += 1;
        if set.team1_points > set.team2_points {
            team1_sets += 1;
        } else if set.team2_points > set.team1_points {
            team2_sets += 1;
        }
    }

    ScoreSummary {
        completed_sets,
        team1_sets,
        team2_sets,
        current_set: current_set(record).map(|set| set.set_number),
    }
}

/// The set currently on court: the unique open set, or the last one recorded.
pub fn current_set(record: &ScoreRecord) -> Option<&SetScore> {
    record
        .sets
        .iter()
        .find(|set| set.is_open())
        .or_else(|| record.sets.last())
}

/// Winner of a completed match, by completed-set count.
///
/// `None` while the match is still running or when the record is tied.
pub fn winner(record: &ScoreRecord) -> Option<Side> {
    if record.status != MatchStatus::Completed {
        return None;
    }

    let summary = summarize(record);
    match summary.team1_sets.cmp(&summary.team2_sets) {
        std::cmp::Ordering::Greater => Some(Side::Team1),
        std::cmp::Ordering::Less => Some(Side::Team2),
        std::cmp::Ordering::Equal => None,
    }
}
