//! The shared storage medium all consumers coordinate through.

/// Storage abstraction layer and error type.
pub mod storage;
/// In-memory lease and score tables backed by concurrent maps.
pub mod tables;
