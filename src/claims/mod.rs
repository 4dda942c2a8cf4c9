//! Advisory single-holder claim leases over matches.

/// Injectable time source.
pub mod clock;

use std::sync::Arc;

use tracing::debug;

pub use clock::{Clock, ManualClock, SystemClock};

use crate::{
    dao::storage::{CoverageStore, StorageResult},
    error::ClaimError,
    model::{ClaimLease, EpochMs, MatchId},
};

/// Availability of a match lease from one consumer's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaseStatus {
    /// Nobody holds an active lease on the match.
    Available,
    /// The asking consumer holds the active lease.
    ClaimedBySelf,
    /// Someone else holds the active lease.
    ClaimedByOther {
        /// Identifier of the current holder.
        holder: String,
    },
}

/// Per-scope handle over the shared claim lease table.
///
/// Expiry is lazy: a lease whose `expires_at` has passed is treated as absent
/// by every operation but stays in storage until the next successful acquire
/// on the same match or an explicit [`sweep`](LeaseStore::sweep). There is no
/// background timer.
///
/// Exclusivity is advisory. Acquire is a check-then-set against a store with
/// no atomic read-modify-write, so two consumers racing the same match can
/// both observe it unclaimed; callers must not treat a held lease as a hard
/// lock.
pub struct LeaseStore {
    store: Arc<dyn CoverageStore>,
    scope: String,
    buffer_ms: EpochMs,
    clock: Arc<dyn Clock>,
}

impl LeaseStore {
    /// Create a lease handle for one event scope.
    pub fn new(
        store: Arc<dyn CoverageStore>,
        scope: impl Into<String>,
        buffer_ms: EpochMs,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            scope: scope.into(),
            buffer_ms,
            clock,
        }
    }

    /// Claim a match until `match_end` plus the configured buffer.
    ///
    /// Succeeds when the match is unclaimed or its previous lease has expired.
    /// Re-acquiring a lease the caller already holds returns the existing
    /// lease unchanged. A still-active lease held by someone else fails with
    /// [`ClaimError::AlreadyClaimed`] and leaves the table untouched.
    pub fn acquire(
        &self,
        match_id: MatchId,
        holder_id: &str,
        match_end: EpochMs,
    ) -> Result<ClaimLease, ClaimError> {
        let now = self.clock.now_ms();

        if let Some(existing) = self.store.lease(&self.scope, match_id)? {
            if existing.is_active(now) {
                if existing.holder_id == holder_id {
                    return Ok(existing);
                }
                return Err(ClaimError::AlreadyClaimed {
                    holder: existing.holder_id,
                });
            }
            debug!(
                scope = %self.scope,
                match_id,
                previous = %existing.holder_id,
                "superseding expired lease"
            );
        }

        let lease = ClaimLease {
            match_id,
            scope: self.scope.clone(),
            holder_id: holder_id.into(),
            acquired_at: now,
            expires_at: match_end + self.buffer_ms,
        };
        self.store.put_lease(lease.clone())?;
        Ok(lease)
    }

    /// Give up a held lease.
    ///
    /// Returns `true` when an active lease held by `holder_id` was removed.
    /// Releasing an unclaimed or expired match, or someone else's lease, is a
    /// silent no-op returning `false`; the table is never mutated on a miss.
    pub fn release(&self, match_id: MatchId, holder_id: &str) -> StorageResult<bool> {
        let now = self.clock.now_ms();

        match self.store.lease(&self.scope, match_id)? {
            Some(lease) if lease.is_active(now) && lease.holder_id == holder_id => {
                self.store.remove_lease(&self.scope, match_id)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Hand a held lease over to another holder.
    ///
    /// The ownership check and the holder swap happen as one operation:
    /// `acquired_at` resets to now, `expires_at` carries over. Fails with
    /// [`ClaimError::NotHolder`] (no mutation) when `from_holder` does not
    /// hold an active lease.
    pub fn transfer(
        &self,
        match_id: MatchId,
        from_holder: &str,
        to_holder: &str,
    ) -> Result<ClaimLease, ClaimError> {
        let now = self.clock.now_ms();

        let Some(lease) = self.store.lease(&self.scope, match_id)? else {
            return Err(ClaimError::NotHolder);
        };
        if !lease.is_active(now) || lease.holder_id != from_holder {
            return Err(ClaimError::NotHolder);
        }

        let transferred = ClaimLease {
            holder_id: to_holder.into(),
            acquired_at: now,
            ..lease
        };
        self.store.put_lease(transferred.clone())?;
        Ok(transferred)
    }

    /// Availability of a match as seen by `viewer_id`.
    ///
    /// Pure read: expiry is evaluated lazily and nothing is deleted as a side
    /// effect.
    pub fn status(&self, match_id: MatchId, viewer_id: &str) -> StorageResult<LeaseStatus> {
        let now = self.clock.now_ms();

        Ok(match self.store.lease(&self.scope, match_id)? {
            Some(lease) if lease.is_active(now) => {
                if lease.holder_id == viewer_id {
                    LeaseStatus::ClaimedBySelf
                } else {
                    LeaseStatus::ClaimedByOther {
                        holder: lease.holder_id,
                    }
                }
            }
            _ => LeaseStatus::Available,
        })
    }

    /// All active leases in the scope, sorted by match id for exporters.
    pub fn list(&self) -> StorageResult<Vec<ClaimLease>> {
        let now = self.clock.now_ms();
        let mut leases: Vec<ClaimLease> = self
            .store
            .leases(&self.scope)?
            .into_iter()
            .filter(|lease| lease.is_active(now))
            .collect();
        leases.sort_by_key(|lease| lease.match_id);
        Ok(leases)
    }

    /// Physically delete expired lease records, returning how many went.
    pub fn sweep(&self) -> StorageResult<usize> {
        let now = self.clock.now_ms();
        let expired: Vec<MatchId> = self
            .store
            .leases(&self.scope)?
            .into_iter()
            .filter(|lease| !lease.is_active(now))
            .map(|lease| lease.match_id)
            .collect();

        for match_id in &expired {
            self.store.remove_lease(&self.scope, *match_id)?;
        }
        if !expired.is_empty() {
            debug!(scope = %self.scope, count = expired.len(), "swept expired leases");
        }
        Ok(expired.len())
    }

    /// Drop every lease in the scope, active or not.
    pub fn clear(&self) -> StorageResult<()> {
        self.store.clear_leases(&self.scope)
    }
}
