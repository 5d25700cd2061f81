//! Test doubles shared by unit tests.

use std::collections::{HashMap, HashSet};

use crate::liveness::ProcessLivenessChecker;

/// Liveness answers scripted per PID. Unlisted PIDs are alive with no start time.
#[derive(Debug, Default, Clone)]
pub struct FakeLiveness {
    dead: HashSet<u32>,
    start_times: HashMap<u32, u64>,
}

impl FakeLiveness {
    pub fn all_alive() -> Self {
        Self::default()
    }

    pub fn with_dead(mut self, pid: u32) -> Self {
        self.dead.insert(pid);
        self
    }

    pub fn with_start_time(mut self, pid: u32, started: u64) -> Self {
        self.start_times.insert(pid, started);
        self
    }
}

impl ProcessLivenessChecker for FakeLiveness {
    fn is_alive(&self, pid: u32) -> bool {
        !self.dead.contains(&pid)
    }

    fn start_time(&self, pid: u32) -> Option<u64> {
        self.start_times.get(&pid).copied()
    }
}
