//! On-disk slot records for one session.
//!
//! A slot file's existence is the only signal that the slot is taken. Records are
//! write-once and remove-only: nothing ever rewrites an existing slot file.
//!
//! # Exclusive Create
//!
//! `try_claim` writes the record to a uniquely named temp file in the session
//! directory, then renames it onto `slot-N.lock` with no-clobber semantics
//! (`renameat2(RENAME_NOREPLACE)` or link + unlink, via `tempfile`). If the
//! target appeared in the meantime the rename fails, the temp file is dropped,
//! and the caller moves on. A reader therefore never sees a half-written record.
//!
//! # Guarded Removal
//!
//! Reclaiming a stale slot and releasing an owned one both go through
//! `remove_if_unchanged`: the slot file is renamed onto a private tombstone and
//! its bytes compared with what the caller inspected. If a fresh claim slipped
//! in between, it is linked back into place instead of being deleted.
//!
//! # Defensive Reads
//!
//! Missing files, unreadable files and corrupt JSON all read as "free". Favoring
//! availability is safe because a corrupt slot is reclaimed by the next claimant
//! exactly like a stale one.

use std::io::{self, Write};

use fs_err as fs;
use tempfile::Builder;

use crate::storage::SlotPaths;
use crate::types::{Claim, SlotIndex};

/// Raw state of one slot file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotRecord {
    Free,
    Claimed { claim: Claim, raw: Vec<u8> },
    /// Present but unparseable. Reads as free; reclaimable like a stale claim.
    Corrupt { raw: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct SlotStore {
    paths: SlotPaths,
}

impl SlotStore {
    pub fn new(paths: SlotPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &SlotPaths {
        &self.paths
    }

    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(self.paths.session_dir())
    }

    /// Returns the claim in `index`, or `None` if the slot is free or unreadable.
    pub fn read_slot(&self, index: SlotIndex) -> Option<Claim> {
        match self.inspect_slot(index) {
            SlotRecord::Claimed { claim, .. } => Some(claim),
            SlotRecord::Free | SlotRecord::Corrupt { .. } => None,
        }
    }

    pub fn inspect_slot(&self, index: SlotIndex) -> SlotRecord {
        let raw = match fs::read(self.paths.slot_file(index)) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    tracing::debug!(slot = index, error = %err, "Unreadable slot file");
                }
                return SlotRecord::Free;
            }
        };

        match serde_json::from_slice::<Claim>(&raw) {
            Ok(claim) => SlotRecord::Claimed { claim, raw },
            Err(err) => {
                tracing::debug!(slot = index, error = %err, "Ignoring corrupt slot record");
                SlotRecord::Corrupt { raw }
            }
        }
    }

    /// Atomically creates the slot file. Returns true if the no-clobber rename
    /// put our record at `slot-N.lock`.
    pub fn try_claim(&self, index: SlotIndex, claim: &Claim) -> bool {
        let target = self.paths.slot_file(index);
        if target.exists() {
            return false;
        }

        let payload = match serde_json::to_vec(claim) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(slot = index, error = %err, "Failed to serialize claim");
                return false;
            }
        };

        let mut tmp = match Builder::new()
            .prefix(".slot-")
            .suffix(".tmp")
            .tempfile_in(self.paths.session_dir())
        {
            Ok(tmp) => tmp,
            Err(err) => {
                tracing::debug!(slot = index, error = %err, "Failed to create claim temp file");
                return false;
            }
        };

        if let Err(err) = tmp.write_all(&payload).and_then(|_| tmp.flush()) {
            tracing::debug!(slot = index, error = %err, "Failed to write claim temp file");
            return false;
        }

        // On failure the temp file comes back inside the error and is removed on drop.
        // On success the record is ours, even if a concurrent guarded removal
        // briefly parks it on a tombstone before linking it back.
        match tmp.persist_noclobber(&target) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(slot = index, error = %err.error, "Lost race for slot");
                false
            }
        }
    }

    /// Deletes the slot file only if it still holds exactly `expected`.
    ///
    /// Returns true if the inspected record was removed. False means the slot was
    /// already gone or had been replaced, and has been left as found.
    pub fn remove_if_unchanged(&self, index: SlotIndex, expected: &[u8]) -> bool {
        let target = self.paths.slot_file(index);

        // The empty temp file reserves a unique name; rename replaces it and the
        // handle deletes the tombstone when dropped.
        let tombstone = match Builder::new()
            .prefix(".reclaim-")
            .suffix(".tmp")
            .tempfile_in(self.paths.session_dir())
        {
            Ok(tombstone) => tombstone,
            Err(err) => {
                tracing::debug!(slot = index, error = %err, "Failed to create tombstone");
                return false;
            }
        };

        if let Err(err) = fs::rename(&target, tombstone.path()) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::debug!(slot = index, error = %err, "Failed to move slot aside");
            }
            return false;
        }

        match fs::read(tombstone.path()) {
            Ok(moved) if moved == expected => true,
            _ => {
                // Someone claimed the slot after we inspected it. Put their record back.
                if let Err(err) = fs::hard_link(tombstone.path(), &target) {
                    tracing::warn!(
                        slot = index,
                        error = %err,
                        "Failed to restore slot record moved during reclaim"
                    );
                }
                false
            }
        }
    }

    /// Deletes the slot file if present. Failures are ignored; a leftover file
    /// is reclaimed later by the staleness check.
    pub fn remove_slot(&self, index: SlotIndex) {
        match fs::remove_file(self.paths.slot_file(index)) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::debug!(slot = index, error = %err, "Failed to remove slot file");
            }
        }
    }
}
