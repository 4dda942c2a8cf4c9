//! Coverage coordination core for volleyball tournament coverage planning.
//!
//! Three concerns live here: deriving which matches cannot both be covered by
//! one observer, an advisory single-holder claim lease over each match, and
//! last-writer-wins score synchronization between independent consumers that
//! share one local store and one in-process bus. There is no network and no
//! consensus; everything weaker than that is deliberate and documented on the
//! types involved.

/// Claim lease state machine and time source.
pub mod claims;
/// Runtime configuration.
pub mod config;
/// Shared storage medium.
pub mod dao;
/// Error taxonomy.
pub mod error;
/// Domain records.
pub mod model;
/// Match index and conflict derivation.
pub mod schedule;
/// Score store and read-side derivations.
pub mod scores;
/// Per-consumer session wiring.
pub mod session;
/// Broadcast bus and reconciliation tasks.
pub mod sync;

pub use config::CoreConfig;
pub use session::CoverageSession;
