//! Decides whether a recorded claim has been abandoned.
//!
//! A claim is stale when any of these hold:
//!
//! 1. The owner PID no longer exists.
//! 2. The owner PID exists but started at a different time than recorded,
//!    meaning the PID was recycled (±2s tolerance).
//! 3. The claim is older than the stale timeout, whether or not the owner lives.

use std::time::Duration;

use crate::liveness::ProcessLivenessChecker;
use crate::types::Claim;

const START_TIME_TOLERANCE_SECS: u64 = 2;

pub fn is_stale(
    claim: &Claim,
    now_ms: i64,
    stale_timeout: Duration,
    liveness: &dyn ProcessLivenessChecker,
) -> bool {
    if !liveness.is_alive(claim.owner_pid) {
        return true;
    }

    if let (Some(recorded), Some(actual)) =
        (claim.proc_started, liveness.start_time(claim.owner_pid))
    {
        if recorded.abs_diff(actual) > START_TIME_TOLERANCE_SECS {
            return true;
        }
    }

    u128::from(claim.age_ms(now_ms)) > stale_timeout.as_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLiveness;

    fn claim(pid: u32, claimed_at: i64) -> Claim {
        Claim {
            owner_pid: pid,
            claimed_at,
            label: "test".to_string(),
            sub_label: None,
            proc_started: None,
        }
    }

    #[test]
    fn dead_owner_is_stale_regardless_of_age() {
        let liveness = FakeLiveness::all_alive().with_dead(77);
        let c = claim(77, 10_000);
        assert!(is_stale(&c, 10_001, Duration::from_secs(3600), &liveness));
    }

    #[test]
    fn old_claim_is_stale_even_if_owner_lives() {
        let liveness = FakeLiveness::all_alive();
        let c = claim(5, 10_000);
        assert!(is_stale(&c, 10_001, Duration::ZERO, &liveness));
        assert!(is_stale(&c, 20_001, Duration::from_secs(10), &liveness));
    }

    #[test]
    fn young_claim_with_live_owner_is_kept() {
        let liveness = FakeLiveness::all_alive();
        let c = claim(5, 10_000);
        assert!(!is_stale(&c, 10_000, Duration::ZERO, &liveness));
        assert!(!is_stale(&c, 19_999, Duration::from_secs(10), &liveness));
        assert!(!is_stale(&c, 20_000, Duration::from_secs(10), &liveness));
    }

    #[test]
    fn future_timestamp_is_not_stale() {
        let liveness = FakeLiveness::all_alive();
        let c = claim(5, 50_000);
        assert!(!is_stale(&c, 10_000, Duration::from_secs(1), &liveness));
    }

    #[test]
    fn recycled_pid_is_stale() {
        let liveness = FakeLiveness::all_alive().with_start_time(9, 2_000);
        let mut c = claim(9, 10_000);
        c.proc_started = Some(1_000);
        assert!(is_stale(&c, 10_001, Duration::from_secs(3600), &liveness));

        c.proc_started = Some(1_999);
        assert!(!is_stale(&c, 10_001, Duration::from_secs(3600), &liveness));
    }

    #[test]
    fn unknown_start_time_falls_back_to_liveness() {
        let liveness = FakeLiveness::all_alive();
        let mut c = claim(9, 10_000);
        c.proc_started = Some(1_000);
        assert!(!is_stale(&c, 10_001, Duration::from_secs(3600), &liveness));
    }
}
