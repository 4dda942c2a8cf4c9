use serde::{Deserialize, Serialize};

use crate::model::{EpochMs, MatchId};

/// A time-bounded, single-holder claim over a match.
///
/// Exactly one lease record exists per `(scope, match_id)` key in the shared
/// table. A lease whose `expires_at` has passed is logically absent even while
/// the record still sits in storage; readers evaluate expiry lazily and the
/// record is only physically replaced by the next successful acquire (or an
/// explicit sweep).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimLease {
    /// Match the lease covers.
    pub match_id: MatchId,
    /// Event scope the lease belongs to.
    pub scope: String,
    /// Opaque identifier of the holder.
    pub holder_id: String,
    /// When the current holder took the lease (reset on transfer).
    pub acquired_at: EpochMs,
    /// When the lease lapses: match end plus the configured buffer.
    pub expires_at: EpochMs,
}

impl ClaimLease {
    /// Whether the lease is still active at `now`.
    pub fn is_active(&self, now: EpochMs) -> bool {
        now < self.expires_at
    }
}
