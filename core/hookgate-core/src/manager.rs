//! Slot lock manager: acquire, release, reap.
//!
//! # Acquire Pass
//!
//! One pass scans indices `0..parallelism` in order:
//!
//! - free slot → try to claim it
//! - stale or corrupt slot → remove it (guarded), then try to claim it
//! - live slot → next index
//!
//! Failed passes back off 100ms, 200ms, 400ms ... capped at 2s, until a pass
//! succeeds or the acquire timeout elapses. Scan order carries no fairness
//! guarantee; a waiter can lose low indices to luckier processes repeatedly.
//!
//! # Ownership
//!
//! A claim is removed only by its owner (matching PID) or by a claimant that
//! judged it stale. Release and reap re-check ownership against the file on disk,
//! so a manager whose slot was reclaimed cannot evict the new holder.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::backoff::Backoff;
use crate::config::LockConfig;
use crate::error::{Result, SlotError};
use crate::liveness::{OsLiveness, ProcessLivenessChecker};
use crate::session::{parent_pid, session_id};
use crate::staleness::is_stale;
use crate::storage::SlotPaths;
use crate::store::{SlotRecord, SlotStore};
use crate::types::{Claim, SlotIndex, SlotStatus};

/// Handle on one session's slot pool.
///
/// Cheap to build and holds no live resource: dropping it releases nothing.
/// Use [`LockManager::acquire_guard`] or [`with_slot`] for scoped release.
#[derive(Debug, Clone)]
pub struct LockManager {
    session_id: String,
    parallelism: usize,
    stale_timeout: Duration,
    acquire_timeout: Duration,
    store: SlotStore,
    liveness: Arc<dyn ProcessLivenessChecker>,
}

impl LockManager {
    /// Builds a manager from resolved configuration. No filesystem access.
    pub fn from_config(config: &LockConfig) -> Self {
        let project_dir = config.resolved_project_dir();
        let session_id = session_id(
            parent_pid(),
            &project_dir,
            config.session_override.as_deref(),
        );
        let store = SlotStore::new(SlotPaths::new(&config.lock_root, &session_id));

        Self {
            session_id,
            parallelism: config.parallelism.max(1),
            stale_timeout: config.stale_timeout,
            acquire_timeout: config.acquire_timeout,
            store,
            liveness: Arc::new(OsLiveness),
        }
    }

    /// Replaces the process liveness probe.
    pub fn with_liveness(mut self, liveness: Arc<dyn ProcessLivenessChecker>) -> Self {
        self.liveness = liveness;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn lock_dir(&self) -> &Path {
        self.store.paths().session_dir()
    }

    pub fn store(&self) -> &SlotStore {
        &self.store
    }

    /// Blocks until a slot is claimed for this process or the acquire timeout passes.
    pub fn acquire_slot(&self, label: &str, sub_label: Option<&str>) -> Result<SlotIndex> {
        let started = Instant::now();
        let pid = std::process::id();
        let proc_started = self.liveness.start_time(pid);
        let mut backoff = Backoff::default();
        let mut passes: u32 = 0;

        loop {
            passes += 1;
            if let Some(index) = self.acquire_pass(pid, proc_started, label, sub_label) {
                tracing::debug!(
                    session = %self.session_id,
                    slot = index,
                    pid,
                    label,
                    passes,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Slot acquired"
                );
                return Ok(index);
            }

            let elapsed = started.elapsed();
            if elapsed >= self.acquire_timeout {
                tracing::warn!(
                    session = %self.session_id,
                    capacity = self.parallelism,
                    label,
                    passes,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Timed out waiting for a slot"
                );
                return Err(SlotError::Timeout {
                    elapsed,
                    capacity: self.parallelism,
                });
            }

            // Never sleep past the deadline; the last pass runs right at it.
            let delay = backoff.next_delay().min(self.acquire_timeout - elapsed);
            tracing::debug!(
                session = %self.session_id,
                label,
                passes,
                delay_ms = delay.as_millis() as u64,
                "All slots busy, backing off"
            );
            thread::sleep(delay);
        }
    }

    fn acquire_pass(
        &self,
        pid: u32,
        proc_started: Option<u64>,
        label: &str,
        sub_label: Option<&str>,
    ) -> Option<SlotIndex> {
        if let Err(err) = self.store.ensure_dir() {
            tracing::debug!(
                session = %self.session_id,
                error = %err,
                "Failed to create lock directory"
            );
            return None;
        }

        let now_ms = Utc::now().timestamp_millis();

        for index in 0..self.parallelism {
            match self.store.inspect_slot(index) {
                SlotRecord::Free => {}
                SlotRecord::Claimed { claim, raw } => {
                    if !is_stale(&claim, now_ms, self.stale_timeout, self.liveness.as_ref()) {
                        continue;
                    }
                    tracing::debug!(
                        session = %self.session_id,
                        slot = index,
                        holder_pid = claim.owner_pid,
                        holder = %claim.display_label(),
                        age_ms = claim.age_ms(now_ms),
                        "Reclaiming stale slot"
                    );
                    self.store.remove_if_unchanged(index, &raw);
                }
                SlotRecord::Corrupt { raw } => {
                    tracing::debug!(
                        session = %self.session_id,
                        slot = index,
                        "Reclaiming corrupt slot"
                    );
                    self.store.remove_if_unchanged(index, &raw);
                }
            }

            let claim = Claim::new(pid, label, sub_label).with_proc_started(proc_started);
            if self.store.try_claim(index, &claim) {
                return Some(index);
            }
        }

        None
    }

    /// Removes the slot if this process still owns it. Otherwise does nothing.
    pub fn release_slot(&self, index: SlotIndex) {
        if self.remove_if_owned(index, std::process::id()) {
            tracing::debug!(session = %self.session_id, slot = index, "Slot released");
        } else {
            tracing::debug!(
                session = %self.session_id,
                slot = index,
                "Release skipped, slot not owned by this process"
            );
        }
    }

    /// Removes every slot owned by this process. Returns how many were removed.
    ///
    /// Meant for interrupt/termination handlers, where the ordinary release path
    /// may never run.
    pub fn cleanup_owned_slots(&self) -> usize {
        let pid = std::process::id();
        let removed = (0..self.parallelism)
            .filter(|&index| self.remove_if_owned(index, pid))
            .count();
        if removed > 0 {
            tracing::debug!(
                session = %self.session_id,
                pid,
                removed,
                "Reaped slots owned by this process"
            );
        }
        removed
    }

    fn remove_if_owned(&self, index: SlotIndex, pid: u32) -> bool {
        match self.store.inspect_slot(index) {
            SlotRecord::Claimed { claim, raw } if claim.owner_pid == pid => {
                self.store.remove_if_unchanged(index, &raw)
            }
            _ => false,
        }
    }

    /// Acquires a slot and returns a guard that releases it on drop.
    pub fn acquire_guard(&self, label: &str, sub_label: Option<&str>) -> Result<SlotGuard<'_>> {
        let index = self.acquire_slot(label, sub_label)?;
        Ok(SlotGuard {
            manager: self,
            index,
        })
    }

    /// Reports every slot without reclaiming anything.
    pub fn snapshot(&self) -> Vec<SlotStatus> {
        let now_ms = Utc::now().timestamp_millis();
        (0..self.parallelism)
            .map(|index| {
                let claim = self.store.read_slot(index);
                let stale = claim.as_ref().is_some_and(|c| {
                    is_stale(c, now_ms, self.stale_timeout, self.liveness.as_ref())
                });
                SlotStatus {
                    index,
                    claim,
                    stale,
                }
            })
            .collect()
    }
}

/// Releases its slot when dropped, including during panic unwinding.
#[derive(Debug)]
pub struct SlotGuard<'a> {
    manager: &'a LockManager,
    index: SlotIndex,
}

impl SlotGuard<'_> {
    pub fn index(&self) -> SlotIndex {
        self.index
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.manager.release_slot(self.index);
    }
}

/// Builds a manager from the process environment.
pub fn create_lock_manager() -> LockManager {
    LockManager::from_config(&LockConfig::from_env())
}

/// Runs `work` while holding a slot, using configuration from the environment.
///
/// With `HOOKGATE_NO_LOCK` set, `work` runs directly and the lock directory is
/// never touched. The slot is released however `work` ends: returned value,
/// returned error value, or panic.
pub fn with_slot<T, F>(label: &str, sub_label: Option<&str>, work: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    with_slot_in(&LockConfig::from_env(), label, sub_label, work)
}

/// [`with_slot`] with explicit configuration.
pub fn with_slot_in<T, F>(
    config: &LockConfig,
    label: &str,
    sub_label: Option<&str>,
    work: F,
) -> Result<T>
where
    F: FnOnce() -> T,
{
    if !config.enabled {
        return Ok(work());
    }

    let manager = LockManager::from_config(config);
    let _guard = manager.acquire_guard(label, sub_label)?;
    Ok(work())
}
