//! Domain records shared across the coordination core.

/// Claim lease records for match coverage.
pub mod lease;
/// Match schedule records supplied by the tournament-data client.
pub mod matches;
/// Live score records and their set-by-set breakdown.
pub mod score;

pub use lease::ClaimLease;
pub use matches::{CourtId, CourtMatch, MatchId};
pub use score::{MatchStatus, SET_OPEN, ScoreRecord, SetScore};

/// Epoch timestamp in milliseconds.
///
/// All wall-clock and logical timestamps in the core use this unit so records
/// coming from the schedule, the lease table, and the score table compare
/// directly.
pub type EpochMs = i64;
