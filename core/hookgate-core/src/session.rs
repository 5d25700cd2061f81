//! Session identification without IPC.
//!
//! Hook commands launched by the same parent process for the same project must
//! agree on a session key so they find the same slot pool. The key is a short
//! MD5 prefix of `"{parent_pid}:{project_dir}"`, or an explicit override.

use std::path::Path;

const SESSION_ID_LEN: usize = 16;

/// Derives the session key shared by every process of one logical run.
///
/// A non-empty `explicit` value is returned verbatim.
pub fn session_id(parent_pid: u32, project_dir: &Path, explicit: Option<&str>) -> String {
    if let Some(id) = explicit.filter(|id| !id.is_empty()) {
        return id.to_string();
    }

    let project = normalize_path(&project_dir.to_string_lossy());
    let digest = format!("{:x}", md5::compute(format!("{}:{}", parent_pid, project)));
    digest[..SESSION_ID_LEN].to_string()
}

/// Parent process id of the caller.
pub fn parent_pid() -> u32 {
    #[cfg(unix)]
    {
        // SAFETY: getppid() has no failure modes; it returns 1 if the parent exited.
        #[allow(unsafe_code)]
        unsafe {
            libc::getppid() as u32
        }
    }
    #[cfg(not(unix))]
    {
        std::process::id()
    }
}

/// Strips trailing slashes except for root "/".
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
