use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::model::{CourtMatch, MatchId};

/// Symmetric adjacency of matches that cannot both be covered by one observer.
///
/// Matches without conflicts are absent from the map rather than mapped to an
/// empty list; callers must treat the two identically. Keys and adjacency
/// lists are sorted by match id so the same schedule always yields the same
/// map regardless of input order.
pub type ConflictMap = IndexMap<MatchId, Vec<MatchId>>;

/// Derive the conflict adjacency for a match list.
///
/// Two matches conflict when their scheduled windows overlap strictly and
/// they are assigned to different courts (same-court overlaps are a venue
/// scheduling artifact, not a coverage conflict). The implementation sorts by
/// start time and sweeps with a set of still-running matches, so each
/// overlapping pair is examined exactly once; the output is identical to the
/// naive all-pairs scan.
pub fn build_conflicts(matches: &[CourtMatch]) -> ConflictMap {
    let mut order: Vec<&CourtMatch> = matches.iter().collect();
    order.sort_by_key(|m| (m.scheduled_start, m.match_id));

    let mut adjacency: BTreeMap<MatchId, BTreeSet<MatchId>> = BTreeMap::new();
    let mut active: Vec<&CourtMatch> = Vec::new();

    for next in order {
        // Matches whose window closed at or before this start can never
        // conflict with anything later in the sweep.
        active.retain(|running| running.scheduled_end > next.scheduled_start);

        for running in &active {
            if running.court_id != next.court_id {
                adjacency
                    .entry(running.match_id)
                    .or_default()
                    .insert(next.match_id);
                adjacency
                    .entry(next.match_id)
                    .or_default()
                    .insert(running.match_id);
            }
        }

        active.push(next);
    }

    adjacency
        .into_iter()
        .filter(|(_, neighbours)| !neighbours.is_empty())
        .map(|(match_id, neighbours)| (match_id, neighbours.into_iter().collect()))
        .collect()
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

    /// All-pairs oracle the sweep must agree with byte for byte.
    fn naive_conflicts(matches: &[CourtMatch]) -> ConflictMap {
        let mut adjacency: BTreeMap<MatchId, BTreeSet<MatchId>> = BTreeMap::new();
        for a in matches {
            for b in matches {
                if a.match_id != b.match_id && a.court_id != b.court_id && a.overlaps(b) {
                    adjacency.entry(a.match_id).or_default().insert(b.match_id);
                }
            }
        }
        adjacency
            .into_iter()
            .map(|(id, set)| (id, set.into_iter().collect()))
            .collect()
    }

    fn fixture() -> Vec<CourtMatch> {
        // 10:00-11:00 style windows expressed as plain milliseconds.
        vec![
            match_at(1, 1, 600_000, 660_000),
            match_at(2, 2, 630_000, 690_000),
            match_at(3, 1, 630_000, 690_000),
            match_at(4, 3, 660_000, 720_000),
            match_at(5, 2, 700_000, 760_000),
            match_at(6, 4, 100_000, 200_000),
        ]
    }

    #[test]
    fn same_court_overlaps_never_conflict() {
        // A{court 1, 10:00-11:00}, B{court 2, 10:30-11:30}, C{court 1, 10:30-11:30}
        let matches = vec![
            match_at(1, 1, 600_000, 660_000),
            match_at(2, 2, 630_000, 690_000),
            match_at(3, 1, 630_000, 690_000),
        ];
        let map = build_conflicts(&matches);

        // A conflicts with B only: C overlaps A but shares its court.
        assert_eq!(map.get(&1).unwrap(), &vec![2]);
        assert_eq!(map.get(&2).unwrap(), &vec![1, 3]);
        assert_eq!(map.get(&3).unwrap(), &vec![2]);
    }

    #[test]
    fn disjoint_windows_never_conflict() {
        let matches = vec![
            match_at(1, 1, 0, 100),
            // Back-to-back: shares the boundary instant, no overlap.
            match_at(2, 2, 100, 200),
            match_at(3, 3, 500, 600),
        ];
        assert!(build_conflicts(&matches).is_empty());
    }

    #[test]
    fn adjacency_is_symmetric() {
        let map = build_conflicts(&fixture());
        for (id, neighbours) in &map {
            for other in neighbours {
                assert!(
                    map.get(other).unwrap().contains(id),
                    "conflict {id} -> {other} is not symmetric"
                );
            }
        }
    }

    #[test]
    fn conflict_free_matches_are_absent() {
        let map = build_conflicts(&fixture());
        assert!(!map.contains_key(&6));
    }

    #[test]
    fn sweep_matches_naive_oracle_in_any_input_order() {
        let mut matches = fixture();
        let oracle = naive_conflicts(&matches);

        assert_eq!(build_conflicts(&matches), oracle);

        matches.reverse();
        assert_eq!(build_conflicts(&matches), oracle);

        matches.swap(0, 3);
        matches.swap(1, 4);
        assert_eq!(build_conflicts(&matches), oracle);
    }

    #[test]
    fn identical_start_times_on_different_courts_conflict() {
        let matches = vec![match_at(1, 1, 0, 100), match_at(2, 2, 0, 100)];
        let map = build_conflicts(&matches);
        assert_eq!(map.get(&1).unwrap(), &vec![2]);
        assert_eq!(map.get(&2).unwrap(), &vec![1]);
    }
}
