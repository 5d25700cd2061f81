//! Shared data types.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Position in the slot pool, in `0..parallelism`.
pub type SlotIndex = usize;

/// Persisted record marking a slot as occupied.
///
/// Written once at claim time and never modified; removed by its owner or by a
/// later claimant that found it stale. `label`/`sub_label` are diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub owner_pid: u32,
    /// Unix epoch milliseconds at claim time.
    pub claimed_at: i64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,
    /// Owner process start time (Unix seconds), used to detect recycled PIDs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proc_started: Option<u64>,
}

impl Claim {
    pub fn new(owner_pid: u32, label: &str, sub_label: Option<&str>) -> Self {
        Self {
            owner_pid,
            claimed_at: Utc::now().timestamp_millis(),
            label: label.to_string(),
            sub_label: sub_label.map(str::to_string),
            proc_started: None,
        }
    }

    pub fn with_proc_started(mut self, proc_started: Option<u64>) -> Self {
        self.proc_started = proc_started;
        self
    }

    /// Milliseconds since the claim was written. Clock skew into the future reads as zero.
    pub fn age_ms(&self, now_ms: i64) -> u64 {
        now_ms.saturating_sub(self.claimed_at).max(0) as u64
    }

    /// `label` or `label/sub_label` for log lines and status output.
    pub fn display_label(&self) -> String {
        match &self.sub_label {
            Some(sub) => format!("{}/{}", self.label, sub),
            None => self.label.clone(),
        }
    }
}

/// Read-only view of one slot, as reported by `LockManager::snapshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    pub index: SlotIndex,
    pub claim: Option<Claim>,
    pub stale: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted() {
        let claim = Claim {
            owner_pid: 10,
            claimed_at: 1_000,
            label: "lint".to_string(),
            sub_label: None,
            proc_started: None,
        };
        let json = serde_json::to_string(&claim).unwrap();
        assert!(!json.contains("sub_label"));
        assert!(!json.contains("proc_started"));

        let parsed: Claim =
            serde_json::from_str(r#"{"owner_pid":10,"claimed_at":1000,"label":"lint"}"#).unwrap();
        assert_eq!(parsed, claim);
    }

    #[test]
    fn age_is_never_negative() {
        let mut claim = Claim::new(1, "test", None);
        claim.claimed_at = 5_000;
        assert_eq!(claim.age_ms(7_500), 2_500);
        assert_eq!(claim.age_ms(4_000), 0);
    }

    #[test]
    fn display_label_joins_sub_label() {
        assert_eq!(Claim::new(1, "lint", Some("eslint")).display_label(), "lint/eslint");
        assert_eq!(Claim::new(1, "lint", None).display_label(), "lint");
    }
}
