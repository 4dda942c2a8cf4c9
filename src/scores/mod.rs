//! Per-consumer score store with last-writer-wins reconciliation.

/// Read-side summary derivation.
pub mod summary;
/// Syntactic validation and advisory warnings.
pub mod validation;

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use validator::{Validate, ValidationErrors};

pub use summary::{ScoreSummary, Side, current_set, summarize, winner};
pub use validation::{ScoreWarning, advisory_warnings, validate_set_sequence};

use crate::{
    claims::Clock,
    config::ScoringRules,
    dao::storage::{CoverageStore, StorageResult},
    error::ScoreError,
    model::{MatchId, MatchStatus, ScoreRecord, SetScore},
    sync::{SyncEvent, SyncHub},
};

/// Payload of a local score edit.
#[derive(Debug, Clone)]
pub struct ScoreUpdate {
    /// Set-by-set scores after the edit.
    pub sets: Vec<SetScore>,
    /// Match status after the edit.
    pub status: MatchStatus,
}

impl Validate for ScoreUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for set in &self.sets {
            if let Err(set_errors) = set.validate() {
                errors.merge_self("sets", Err(set_errors));
            }
        }

        if let Err(err) = validate_set_sequence(&self.sets) {
            errors.add("sets", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Result of an accepted score edit.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// The record as written and broadcast.
    pub record: ScoreRecord,
    /// Advisory warnings about unusual scores; the edit is stored regardless.
    pub warnings: Vec<ScoreWarning>,
}

/// What happened to an incoming record during merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The incoming record replaced the local one.
    Applied,
    /// The incoming record was older (or tied) and was dropped.
    Stale,
    /// The record belongs to another scope and was discarded.
    ForeignScope,
}

/// One consumer's view of the live scores for an event scope.
///
/// Writes go three ways at once: into the local view, through to the shared
/// table, and out on the sync bus. Remote records arrive through the bus
/// subscriber and the reconciliation poll, and both paths funnel into the one
/// last-writer-wins merge in [`apply_remote`](ScoreStore::apply_remote).
pub struct ScoreStore {
    scope: String,
    writer_id: String,
    rules: ScoringRules,
    store: Arc<dyn CoverageStore>,
    hub: SyncHub,
    clock: Arc<dyn Clock>,
    local: DashMap<MatchId, ScoreRecord>,
}

impl ScoreStore {
    /// Create a score view for one writer within one event scope.
    pub fn new(
        store: Arc<dyn CoverageStore>,
        hub: SyncHub,
        scope: impl Into<String>,
        writer_id: impl Into<String>,
        rules: ScoringRules,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            scope: scope.into(),
            writer_id: writer_id.into(),
            rules,
            store,
            hub,
            clock,
            local: DashMap::new(),
        }
    }

    /// The writer identity stamped on records produced by this store.
    pub fn writer_id(&self) -> &str {
        &self.writer_id
    }

    /// The event scope this store belongs to.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Record a score edit.
    ///
    /// The new record is stamped with a logical timestamp strictly greater
    /// than the previous record's for the match, stored locally and in the
    /// shared table, and broadcast on the bus. Structurally malformed
    /// submissions are rejected; unusual scores are accepted and reported as
    /// warnings.
    pub fn update(
        &self,
        match_id: MatchId,
        update: ScoreUpdate,
    ) -> Result<UpdateOutcome, ScoreError> {
        update.validate()?;
        let warnings = advisory_warnings(&update.sets, &self.rules);

        let now = self.clock.now_ms();
        let previous = self
            .local
            .get(&match_id)
            .map(|record| record.last_updated)
            .unwrap_or(i64::MIN);
        // Two edits landing within the same millisecond still order.
        let last_updated = now.max(previous.saturating_add(1));

        let record = ScoreRecord {
            match_id,
            scope: self.scope.clone(),
            sets: update.sets,
            status: update.status,
            last_updated,
            last_updated_by: self.writer_id.clone(),
        };

        self.local.insert(match_id, record.clone());
        self.store.put_score(record.clone())?;
        self.hub.publish(SyncEvent {
            scope: self.scope.clone(),
            match_id,
            record: record.clone(),
        });

        Ok(UpdateOutcome { record, warnings })
    }

    /// Current record for a match, if any writer has produced one.
    pub fn get(&self, match_id: MatchId) -> Option<ScoreRecord> {
        self.local.get(&match_id).map(|record| record.value().clone())
    }

    /// All records in this view, sorted by match id for exporters.
    pub fn list(&self) -> Vec<ScoreRecord> {
        let mut records: Vec<ScoreRecord> =
            self.local.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by_key(|record| record.match_id);
        records
    }

    /// Drop every record for the scope, locally and in the shared table.
    pub fn clear(&self) -> StorageResult<()> {
        self.local.clear();
        self.store.clear_scores(&self.scope)
    }

    /// Merge an incoming record under the last-writer-wins rule.
    ///
    /// Replaces the local record iff none exists or the incoming one carries
    /// a strictly higher timestamp; ties keep the local value. A dropped
    /// record is expected steady-state behaviour, not a failure.
    pub fn apply_remote(&self, incoming: ScoreRecord) -> MergeOutcome {
        if incoming.scope != self.scope {
            return MergeOutcome::ForeignScope;
        }

        // The read guard must drop before the insert below, or the two
        // accesses deadlock on the same shard.
        if let Some(local) = self.local.get(&incoming.match_id) {
            if incoming.last_updated <= local.last_updated {
                debug!(
                    scope = %self.scope,
                    match_id = incoming.match_id,
                    incoming = incoming.last_updated,
                    local = local.last_updated,
                    "dropping stale score record"
                );
                return MergeOutcome::Stale;
            }
        }
        self.local.insert(incoming.match_id, incoming);
        MergeOutcome::Applied
    }

    /// Merge a bus event, discarding it when it belongs to another scope.
    pub fn apply_event(&self, event: SyncEvent) -> MergeOutcome {
        if event.scope != self.scope {
            debug!(
                ours = %self.scope,
                theirs = %event.scope,
                "discarding sync event for foreign scope"
            );
            return MergeOutcome::ForeignScope;
        }
        self.apply_remote(event.record)
    }

    /// Re-read the shared table for this scope and merge every record found.
    ///
    /// This is the durability backstop behind the fire-and-forget broadcast:
    /// it bounds staleness to one polling interval no matter how many bus
    /// events were missed. Returns how many records were applied.
    pub fn poll_shared(&self) -> StorageResult<usize> {
        let mut applied = 0;
        for record in self.store.scores(&self.scope)? {
            if self.apply_remote(record) == MergeOutcome::Applied {
                applied += 1;
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        claims::ManualClock,
        dao::tables::MemoryStore,
        model::SET_OPEN,
    };

    fn set(set_number: u8, team1: u16, team2: u16, completed_at: i64) -> SetScore {
        SetScore {
            set_number,
            team1_points: team1,
            team2_points: team2,
            completed_at,
        }
    }

    fn fixture(writer: &str) -> (ScoreStore, Arc<ManualClock>, Arc<MemoryStore>) {
        let clock = Arc::new(ManualClock::starting_at(10_000));
        let store = MemoryStore::shared();
        let scores = ScoreStore::new(
            store.clone(),
            SyncHub::new(8),
            "event-1",
            writer,
            ScoringRules::default(),
            clock.clone(),
        );
        (scores, clock, store)
    }

    fn remote(match_id: MatchId, last_updated: i64, writer: &str) -> ScoreRecord {
        ScoreRecord {
            match_id,
            scope: "event-1".into(),
            sets: vec![set(1, 12, 9, SET_OPEN)],
            status: MatchStatus::InProgress,
            last_updated,
            last_updated_by: writer.into(),
        }
    }

    #[test]
    fn update_then_get_round_trips() {
        let (scores, clock, _) = fixture("alice");
        let update = ScoreUpdate {
            sets: vec![set(1, 25, 20, 1_000), set(2, 3, 1, SET_OPEN)],
            status: MatchStatus::InProgress,
        };

        let outcome = scores.update(7, update.clone()).unwrap();
        assert!(outcome.warnings.is_empty());
        assert!(outcome.record.last_updated >= clock.now_ms());

        let stored = scores.get(7).unwrap();
        assert_eq!(stored.sets, update.sets);
        assert_eq!(stored.status, MatchStatus::InProgress);
        assert_eq!(stored.last_updated_by, "alice");
    }

    #[test]
    fn update_writes_through_to_shared_table_and_bus() {
        let (scores, _, store) = fixture("alice");
        let mut receiver = scores.hub.subscribe();

        let outcome = scores
            .update(
                7,
                ScoreUpdate {
                    sets: vec![set(1, 5, 3, SET_OPEN)],
                    status: MatchStatus::InProgress,
                },
            )
            .unwrap();

        assert_eq!(
            store.score("event-1", 7).unwrap(),
            Some(outcome.record.clone())
        );
        let event = receiver.try_recv().unwrap();
        assert_eq!(event.scope, "event-1");
        assert_eq!(event.record, outcome.record);
    }

    #[test]
    fn timestamps_are_strictly_increasing_per_match() {
        let (scores, clock, _) = fixture("alice");
        let update = || ScoreUpdate {
            sets: vec![set(1, 1, 0, SET_OPEN)],
            status: MatchStatus::InProgress,
        };

        let first = scores.update(7, update()).unwrap().record.last_updated;
        // Same millisecond on the clock.
        let second = scores.update(7, update()).unwrap().record.last_updated;
        assert!(second > first);

        clock.advance(60_000);
        let third = scores.update(7, update()).unwrap().record.last_updated;
        assert!(third > second);
        assert_eq!(third, clock.now_ms());
    }

    #[test]
    fn malformed_submission_is_rejected_without_storing() {
        let (scores, _, store) = fixture("alice");
        let err = scores
            .update(
                7,
                ScoreUpdate {
                    sets: vec![set(1, 4, 2, SET_OPEN), set(2, 25, 20, 2_000)],
                    status: MatchStatus::InProgress,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ScoreError::Rejected(_)));
        assert!(scores.get(7).is_none());
        assert_eq!(store.score("event-1", 7).unwrap(), None);
    }

    #[test]
    fn set_number_out_of_range_is_rejected() {
        let (scores, _, _) = fixture("alice");
        let err = scores
            .update(
                7,
                ScoreUpdate {
                    sets: vec![set(6, 4, 2, SET_OPEN)],
                    status: MatchStatus::InProgress,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ScoreError::Rejected(_)));
    }

    #[test]
    fn unusual_scores_are_accepted_with_warnings() {
        let (scores, _, _) = fixture("alice");
        let outcome = scores
            .update(
                7,
                ScoreUpdate {
                    sets: vec![set(1, 51, 49, 1_000)],
                    status: MatchStatus::InProgress,
                },
            )
            .unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            outcome.warnings[0],
            ScoreWarning::ScoreAboveCap { points: 51, .. }
        ));
        // Stored despite the warning.
        assert!(scores.get(7).is_some());
    }

    #[test]
    fn merge_keeps_highest_timestamp_in_any_order() {
        let records = vec![
            remote(7, 3, "a"),
            remote(7, 9, "b"),
            remote(7, 5, "c"),
            remote(7, 1, "d"),
        ];

        let mut orders = vec![records.clone()];
        let mut reversed = records.clone();
        reversed.reverse();
        orders.push(reversed);
        let mut rotated = records.clone();
        rotated.rotate_left(2);
        orders.push(rotated);

        for order in orders {
            let (scores, _, _) = fixture("observer");
            for record in order {
                scores.apply_remote(record);
            }
            let survivor = scores.get(7).unwrap();
            assert_eq!(survivor.last_updated, 9);
            assert_eq!(survivor.last_updated_by, "b");
        }
    }

    #[test]
    fn tie_keeps_local_record() {
        let (scores, _, _) = fixture("observer");
        assert_eq!(scores.apply_remote(remote(7, 5, "first")), MergeOutcome::Applied);
        assert_eq!(scores.apply_remote(remote(7, 5, "second")), MergeOutcome::Stale);
        assert_eq!(scores.get(7).unwrap().last_updated_by, "first");
    }

    #[test]
    fn stale_record_does_not_revert_newer_state() {
        // Writer A updates at logical time 5; writer B's cached copy at time 3
        // arrives afterwards and must not win.
        let (scores, _, _) = fixture("observer");
        scores.apply_remote(remote(7, 5, "writer-a"));
        assert_eq!(
            scores.apply_remote(remote(7, 3, "writer-b")),
            MergeOutcome::Stale
        );
        assert_eq!(scores.get(7).unwrap().last_updated_by, "writer-a");
    }

    #[test]
    fn foreign_scope_events_are_discarded() {
        let (scores, _, _) = fixture("observer");
        let mut event_record = remote(7, 5, "writer-a");
        event_record.scope = "event-2".into();

        let outcome = scores.apply_event(SyncEvent {
            scope: "event-2".into(),
            match_id: 7,
            record: event_record,
        });
        assert_eq!(outcome, MergeOutcome::ForeignScope);
        assert!(scores.get(7).is_none());
    }

    #[test]
    fn poll_shared_reconciles_missed_updates() {
        let (scores, _, store) = fixture("observer");
        store.put_score(remote(7, 5, "writer-a")).unwrap();
        store.put_score(remote(8, 2, "writer-b")).unwrap();

        assert_eq!(scores.poll_shared().unwrap(), 2);
        assert_eq!(scores.get(7).unwrap().last_updated, 5);

        // A second poll with nothing new applies nothing.
        assert_eq!(scores.poll_shared().unwrap(), 0);
    }

    #[test]
    fn clear_empties_local_view_and_shared_table() {
        let (scores, _, store) = fixture("alice");
        scores
            .update(
                7,
                ScoreUpdate {
                    sets: vec![set(1, 5, 3, SET_OPEN)],
                    status: MatchStatus::InProgress,
                },
            )
            .unwrap();

        scores.clear().unwrap();
        assert!(scores.list().is_empty());
        assert!(store.scores("event-1").unwrap().is_empty());
    }
}
