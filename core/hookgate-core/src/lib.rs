//! # hookgate-core
//!
//! Caps how many hook commands of one session run at the same time, using only
//! the filesystem for coordination. Participants are independent processes with
//! no shared memory and no coordinating parent.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Backoff sleeps the calling thread.
//! - **Filesystem is the source of truth**: a slot file exists iff the slot is taken.
//! - **Graceful degradation**: contention, corrupt records and cleanup failures are
//!   absorbed. Only an acquire timeout reaches the caller.
//! - **No hidden state**: [`LockManager`] is a plain value; build one per use.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hookgate_core::with_slot;
//!
//! let status = with_slot("lint", Some("eslint"), || run_hook())?;
//! ```
//!
//! ## Module Structure
//!
//! - [`config`]: environment overrides and defaults
//! - [`session`]: deterministic session key from parent PID + project dir
//! - [`storage`]: slot file layout under the temp root
//! - [`store`]: atomic claim, read and removal of slot files
//! - [`liveness`] / [`staleness`]: when a claim counts as abandoned
//! - [`manager`]: acquire loop, release, reaper, scoped helper

pub mod backoff;
pub mod config;
pub mod error;
pub mod liveness;
pub mod manager;
pub mod session;
pub mod staleness;
pub mod storage;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::{is_locking_enabled, LockConfig};
pub use error::{Result, SlotError};
pub use liveness::{OsLiveness, ProcessLivenessChecker};
pub use manager::{create_lock_manager, with_slot, with_slot_in, LockManager, SlotGuard};
pub use session::session_id;
pub use staleness::is_stale;
pub use store::{SlotRecord, SlotStore};
pub use types::{Claim, SlotIndex, SlotStatus};
