//! Error taxonomy of the coordination core.
//!
//! Contention is steady-state here, not an exceptional condition: a lost
//! acquire or a stale sync record is reported as an ordinary value and nothing
//! in this module is ever raised as a panic.

use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, model::MatchId};

/// Errors returned by claim lease operations.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Another holder owns an active lease on the match.
    #[error("match is already claimed by `{holder}`")]
    AlreadyClaimed {
        /// Identifier of the current active holder.
        holder: String,
    },
    /// The caller does not hold an active lease on the match.
    #[error("caller is not the active lease holder")]
    NotHolder,
    /// The match id is not present in the current schedule.
    #[error("match `{match_id}` is not in the schedule")]
    UnknownMatch {
        /// The offending match id.
        match_id: MatchId,
    },
    /// The backing store could not be read or written.
    #[error("storage unavailable")]
    Storage(#[from] StorageError),
}

/// Errors returned by score store operations.
///
/// Only syntactically malformed submissions are rejected; unusual-but-valid
/// scores are accepted and annotated with [`ScoreWarning`]s instead.
///
/// [`ScoreWarning`]: crate::scores::ScoreWarning
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The submitted sets are structurally malformed.
    #[error("score submission rejected: {0}")]
    Rejected(#[from] ValidationErrors),
    /// The backing store could not be read or written.
    #[error("storage unavailable")]
    Storage(#[from] StorageError),
}
