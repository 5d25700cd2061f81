//! Path layout for slot files.
//!
//! ```text
//! <lock_root>/hookgate-slots/<session_id>/
//! ├── slot-0.lock
//! ├── slot-1.lock
//! └── .slot-XXXXXX.tmp   # in-flight claim, renamed into place or removed
//! ```
//!
//! Production code uses `std::env::temp_dir()` as the lock root.
//! Tests use `SlotPaths::new(temp_dir, ..)` for isolation.

use std::path::{Path, PathBuf};

pub const NAMESPACE_DIR: &str = "hookgate-slots";
pub const SLOT_PREFIX: &str = "slot-";
pub const SLOT_SUFFIX: &str = ".lock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPaths {
    session_dir: PathBuf,
}

impl SlotPaths {
    pub fn new(lock_root: &Path, session_id: &str) -> Self {
        Self {
            session_dir: lock_root.join(NAMESPACE_DIR).join(session_id),
        }
    }

    /// Directory holding every slot file of the session.
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn slot_file(&self, index: usize) -> PathBuf {
        self.session_dir.join(slot_file_name(index))
    }
}

pub fn slot_file_name(index: usize) -> String {
    format!("{SLOT_PREFIX}{index}{SLOT_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_namespaced_by_session() {
        let paths = SlotPaths::new(Path::new("/tmp"), "abc123");
        assert_eq!(
            paths.session_dir(),
            Path::new("/tmp/hookgate-slots/abc123")
        );
        assert_eq!(
            paths.slot_file(3),
            PathBuf::from("/tmp/hookgate-slots/abc123/slot-3.lock")
        );
    }

    #[test]
    fn slot_file_name_uses_index() {
        assert_eq!(slot_file_name(0), "slot-0.lock");
        assert_eq!(slot_file_name(12), "slot-12.lock");
    }
}
