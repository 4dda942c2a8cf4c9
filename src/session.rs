//! Per-consumer wiring of the coordination core.

use std::sync::{Arc, RwLock};

use tokio::{sync::watch, task::JoinHandle};
use tracing::info;
use uuid::Uuid;

use crate::{
    claims::{Clock, LeaseStatus, LeaseStore, SystemClock},
    config::CoreConfig,
    dao::storage::{CoverageStore, StorageResult},
    error::{ClaimError, ScoreError},
    model::{ClaimLease, CourtMatch, MatchId, ScoreRecord},
    schedule::{ConflictIndex, MatchIndex},
    scores::{ScoreStore, ScoreUpdate, UpdateOutcome},
    sync::{SyncHub, reconcile},
};

/// One consumer (a tab, a device) participating in coverage coordination.
///
/// Every session holds its own lease handle, score view, and schedule index,
/// all against the one shared store and bus. Spawning a session starts two
/// background tasks, the bus subscriber and the reconciliation poller; both
/// stop when the session is closed.
pub struct CoverageSession {
    consumer_id: String,
    leases: LeaseStore,
    scores: Arc<ScoreStore>,
    schedule: RwLock<Schedule>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

#[derive(Default)]
struct Schedule {
    index: MatchIndex,
    conflicts: ConflictIndex,
}

impl CoverageSession {
    /// Open a session for an event scope with a generated consumer identity.
    pub fn spawn(
        store: Arc<dyn CoverageStore>,
        hub: SyncHub,
        scope: impl Into<String>,
        config: &CoreConfig,
    ) -> Self {
        Self::spawn_as(
            store,
            hub,
            scope,
            Uuid::new_v4().to_string(),
            config,
            Arc::new(SystemClock),
        )
    }

    /// Open a session with an explicit consumer identity and clock.
    pub fn spawn_as(
        store: Arc<dyn CoverageStore>,
        hub: SyncHub,
        scope: impl Into<String>,
        consumer_id: impl Into<String>,
        config: &CoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let scope = scope.into();
        let consumer_id = consumer_id.into();

        let leases = LeaseStore::new(
            store.clone(),
            scope.clone(),
            config.lease_buffer_ms(),
            clock.clone(),
        );
        let scores = Arc::new(ScoreStore::new(
            store,
            hub.clone(),
            scope.clone(),
            consumer_id.clone(),
            config.scoring,
            clock,
        ));

        let (shutdown, shutdown_rx) = watch::channel(false);
        let tasks = vec![
            tokio::spawn(reconcile::run_subscriber(
                hub.subscribe(),
                scores.clone(),
                shutdown_rx.clone(),
            )),
            tokio::spawn(reconcile::run_poller(
                scores.clone(),
                config.poll_interval,
                shutdown_rx,
            )),
        ];

        info!(%scope, consumer = %consumer_id, "coverage session started");
        Self {
            consumer_id,
            leases,
            scores,
            schedule: RwLock::new(Schedule::default()),
            shutdown,
            tasks,
        }
    }

    /// This session's consumer identity, used as holder and writer id.
    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }

    /// Replace the schedule wholesale and rebuild the conflict index.
    pub fn refresh_schedule(&self, matches: Vec<CourtMatch>) {
        let index = MatchIndex::new(matches);
        let conflicts = ConflictIndex::build(&index);
        let mut schedule = self.schedule.write().unwrap_or_else(|e| e.into_inner());
        *schedule = Schedule { index, conflicts };
    }

    /// Look up a match in the current schedule.
    pub fn find_match(&self, match_id: MatchId) -> Option<CourtMatch> {
        let schedule = self.schedule.read().unwrap_or_else(|e| e.into_inner());
        schedule.index.get(match_id).cloned()
    }

    /// Matches that cannot be covered together with `match_id`.
    ///
    /// Advisory information for the planner UI; claiming a conflicted match
    /// is allowed.
    pub fn conflicts_for(&self, match_id: MatchId) -> Vec<MatchId> {
        let schedule = self.schedule.read().unwrap_or_else(|e| e.into_inner());
        schedule.conflicts.conflicts_for(match_id).to_vec()
    }

    /// Claim a match for this consumer, using the schedule for its end time.
    pub fn claim(&self, match_id: MatchId) -> Result<ClaimLease, ClaimError> {
        let Some(court_match) = self.find_match(match_id) else {
            return Err(ClaimError::UnknownMatch { match_id });
        };
        self.leases
            .acquire(match_id, &self.consumer_id, court_match.scheduled_end)
    }

    /// Give up this consumer's claim on a match.
    pub fn release(&self, match_id: MatchId) -> StorageResult<bool> {
        self.leases.release(match_id, &self.consumer_id)
    }

    /// Hand this consumer's claim over to another holder.
    pub fn transfer(&self, match_id: MatchId, to_holder: &str) -> Result<ClaimLease, ClaimError> {
        self.leases.transfer(match_id, &self.consumer_id, to_holder)
    }

    /// Availability of a match lease from this consumer's point of view.
    pub fn claim_status(&self, match_id: MatchId) -> StorageResult<LeaseStatus> {
        self.leases.status(match_id, &self.consumer_id)
    }

    /// Lease handle, for exporters and direct table maintenance.
    pub fn leases(&self) -> &LeaseStore {
        &self.leases
    }

    /// Record a score edit as this consumer.
    pub fn record_score(
        &self,
        match_id: MatchId,
        update: ScoreUpdate,
    ) -> Result<UpdateOutcome, ScoreError> {
        self.scores.update(match_id, update)
    }

    /// Current score record for a match, as reconciled into this session.
    pub fn score(&self, match_id: MatchId) -> Option<ScoreRecord> {
        self.scores.get(match_id)
    }

    /// Score view handle, for exporters.
    pub fn scores(&self) -> &ScoreStore {
        &self.scores
    }

    /// Stop the background tasks and consume the session.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
        info!(consumer = %self.consumer_id, "coverage session closed");
    }
}
