//! Match schedule indexing and conflict derivation.

/// Conflict adjacency construction.
pub mod conflicts;

use std::collections::HashMap;

pub use conflicts::{ConflictMap, build_conflicts};

use crate::model::{CourtMatch, MatchId};

/// Immutable-per-refresh index over the current match list.
///
/// The tournament-data client refreshes the schedule wholesale; each refresh
/// produces a fresh index and a fresh [`ConflictIndex`], and neither is
/// mutated afterwards.
#[derive(Debug, Default)]
pub struct MatchIndex {
    matches: Vec<CourtMatch>,
    by_id: HashMap<MatchId, usize>,
}

impl MatchIndex {
    /// Build an index over a freshly fetched match list.
    pub fn new(matches: Vec<CourtMatch>) -> Self {
        let by_id = matches
            .iter()
            .enumerate()
            .map(|(position, m)| (m.match_id, position))
            .collect();
        Self { matches, by_id }
    }

    /// Look up a match by id.
    pub fn get(&self, match_id: MatchId) -> Option<&CourtMatch> {
        self.by_id
            .get(&match_id)
            .and_then(|position| self.matches.get(*position))
    }

    /// All matches in fetch order.
    pub fn matches(&self) -> &[CourtMatch] {
        &self.matches
    }

    /// Number of matches in the index.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether the index holds no matches.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Derived adjacency of "cannot both be covered" relationships.
///
/// Built once per schedule refresh and never mutated, so it is safe to read
/// from any task without synchronization.
#[derive(Debug, Default)]
pub struct ConflictIndex {
    map: ConflictMap,
}

impl ConflictIndex {
    /// Derive the conflict adjacency for an indexed schedule.
    pub fn build(index: &MatchIndex) -> Self {
        Self {
            map: build_conflicts(index.matches()),
        }
    }

    /// Matches that cannot be covered together with `match_id`.
    ///
    /// A match absent from the map has no conflicts; callers get the same
    /// empty slice either way.
    pub fn conflicts_for(&self, match_id: MatchId) -> &[MatchId] {
        self.map
            .get(&match_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether two matches conflict.
    pub fn conflicts(&self, a: MatchId, b: MatchId) -> bool {
        self.conflicts_for(a).contains(&b)
    }

    /// The full adjacency map, for exporters.
    pub fn as_map(&self) -> &ConflictMap {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_at(match_id: MatchId, court_id: u32, start: i64, end: i64) -> CourtMatch {
        CourtMatch {
            match_id,
            court_id,
            scheduled_start: start,
            scheduled_end: end,
            team1: format!("team-{match_id}-a"),
            team2: format!("team-{match_id}-b"),
        }
    }

    #[test]
    fn index_looks_up_by_id() {
        let index = MatchIndex::new(vec![
            match_at(10, 1, 0, 100),
            match_at(20, 2, 50, 150),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(20).map(|m| m.court_id), Some(2));
        assert!(index.get(30).is_none());
    }

    #[test]
    fn absent_match_has_empty_conflicts() {
        let index = MatchIndex::new(vec![match_at(10, 1, 0, 100)]);
        let conflicts = ConflictIndex::build(&index);
        assert!(conflicts.conflicts_for(10).is_empty());
        assert!(conflicts.conflicts_for(999).is_empty());
    }
}
