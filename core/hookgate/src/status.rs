//! `hookgate status` and `hookgate session`: read-only views of the slot pool.

use chrono::Utc;
use hookgate_core::{LockConfig, LockManager, SlotStatus};
use serde_json::json;

pub fn run(config: &LockConfig, as_json: bool) -> Result<(), String> {
    let manager = LockManager::from_config(config);
    let slots = manager.snapshot();

    if as_json {
        let report = json!({
            "session_id": manager.session_id(),
            "lock_dir": manager.lock_dir(),
            "capacity": manager.parallelism(),
            "enabled": config.enabled,
            "slots": slots,
        });
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize status: {}", e))?;
        println!("{}", text);
        return Ok(());
    }

    println!("session:  {}", manager.session_id());
    println!("lock dir: {}", manager.lock_dir().display());
    println!(
        "capacity: {}{}",
        manager.parallelism(),
        if config.enabled { "" } else { " (locking disabled)" }
    );
    let now_ms = Utc::now().timestamp_millis();
    for slot in &slots {
        println!("{}", format_slot(slot, now_ms));
    }
    Ok(())
}

pub fn print_session(config: &LockConfig) {
    let manager = LockManager::from_config(config);
    println!("{}", manager.session_id());
    println!("{}", manager.lock_dir().display());
}

fn format_slot(slot: &SlotStatus, now_ms: i64) -> String {
    match &slot.claim {
        None => format!("  [{}] free", slot.index),
        Some(claim) => format!(
            "  [{}] pid {} {} ({}s){}",
            slot.index,
            claim.owner_pid,
            claim.display_label(),
            claim.age_ms(now_ms) / 1000,
            if slot.stale { " stale" } else { "" }
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookgate_core::Claim;

    #[test]
    fn formats_free_and_held_slots() {
        let free = SlotStatus {
            index: 0,
            claim: None,
            stale: false,
        };
        assert_eq!(format_slot(&free, 0), "  [0] free");

        let held = SlotStatus {
            index: 1,
            claim: Some(Claim {
                owner_pid: 42,
                claimed_at: 1_000,
                label: "lint".to_string(),
                sub_label: Some("eslint".to_string()),
                proc_started: None,
            }),
            stale: true,
        };
        assert_eq!(
            format_slot(&held, 66_000),
            "  [1] pid 42 lint/eslint (65s) stale"
        );
    }
}
