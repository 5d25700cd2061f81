//! Error types for hookgate-core operations.
//!
//! Slot contention, corrupt slot files and cleanup failures are absorbed inside
//! the lock manager. The only error an acquirer ever sees is [`SlotError::Timeout`].

use std::time::Duration;

use crate::config::{ACQUIRE_TIMEOUT_ENV, PARALLELISM_ENV};

#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    /// No slot became available before the acquire deadline.
    #[error(
        "hook slot acquisition timed out after {secs:.1}s (capacity {capacity}); \
         raise {parallelism_env} to run more hooks at once or \
         {timeout_env} to wait longer",
        secs = .elapsed.as_secs_f64(),
        parallelism_env = PARALLELISM_ENV,
        timeout_env = ACQUIRE_TIMEOUT_ENV
    )]
    Timeout { elapsed: Duration, capacity: usize },
}

impl SlotError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SlotError::Timeout { .. })
    }
}

/// Convenience type alias for Results using SlotError.
pub type Result<T> = std::result::Result<T, SlotError>;
