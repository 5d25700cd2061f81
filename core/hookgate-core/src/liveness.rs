//! Process liveness probing.
//!
//! The staleness check only needs two questions answered about a PID: does it
//! exist, and when did it start. [`ProcessLivenessChecker`] abstracts both so
//! tests can describe dead or recycled holders without spawning processes.

use std::fmt::Debug;

pub trait ProcessLivenessChecker: Debug + Send + Sync {
    fn is_alive(&self, pid: u32) -> bool;

    /// Start time of `pid` in Unix seconds, if the platform exposes it.
    fn start_time(&self, _pid: u32) -> Option<u64> {
        None
    }
}

/// Probes real processes: `kill(pid, 0)` for existence, sysinfo for start time.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsLiveness;

impl ProcessLivenessChecker for OsLiveness {
    fn is_alive(&self, pid: u32) -> bool {
        is_pid_alive(pid)
    }

    fn start_time(&self, pid: u32) -> Option<u64> {
        get_process_start_time(pid)
    }
}

pub fn is_pid_alive(pid: u32) -> bool {
    // pid 0 would address our own process group.
    if pid == 0 || pid > i32::MAX as u32 {
        return false;
    }

    #[cfg(unix)]
    {
        // SAFETY: signal 0 performs only the existence and permission check.
        #[allow(unsafe_code)]
        let rc = unsafe { libc::kill(pid as i32, 0) };
        if rc == 0 {
            return true;
        }
        // EPERM: the process exists but belongs to another user.
        std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
    }
    #[cfg(not(unix))]
    {
        get_process_start_time(pid).is_some()
    }
}

/// Start time of a process (Unix seconds). Refreshes only the one PID.
pub fn get_process_start_time(pid: u32) -> Option<u64> {
    use sysinfo::{Pid, ProcessRefreshKind, System};

    let mut sys = System::new();
    let sys_pid = Pid::from(pid as usize);
    sys.refresh_process_specifics(sys_pid, ProcessRefreshKind::new());
    sys.process(sys_pid).map(|process| process.start_time())
}
