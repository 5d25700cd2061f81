//! `hookgate run`: execute one hook command inside a slot.
//!
//! ## Lifecycle
//!
//! 1. Acquire a slot (blocks with backoff; default SIGINT behavior applies, and
//!    an interrupted wait leaves nothing behind)
//! 2. Install SIGINT/SIGTERM capture, spawn the command
//! 3. Poll the child; on a captured signal kill it and reap our slots
//! 4. Release the slot and exit with the child's status

use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::Duration;

use hookgate_core::{with_slot_in, LockConfig, LockManager};

use crate::signals;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(
    config: &LockConfig,
    label: &str,
    sub_label: Option<&str>,
    command: &[String],
) -> Result<i32, String> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| "No command given".to_string())?;

    let outcome = with_slot_in(config, label, sub_label, || -> Result<i32, String> {
        signals::install();
        let child = Command::new(program)
            .args(args)
            .spawn()
            .map_err(|e| format!("Failed to spawn {}: {}", program, e))?;
        supervise(config, child)
    });

    match outcome {
        Ok(result) => result,
        Err(err) => Err(err.to_string()),
    }
}

fn supervise(config: &LockConfig, mut child: Child) -> Result<i32, String> {
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|e| format!("Failed to wait for child: {}", e))?
        {
            return Ok(exit_code(status));
        }

        if let Some(signo) = signals::received() {
            tracing::debug!(signal = signo, pid = child.id(), "Interrupted, stopping hook");
            let _ = child.kill();
            let _ = child.wait();
            if config.enabled {
                LockManager::from_config(config).cleanup_owned_slots();
            }
            return Ok(128 + signo);
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signo) = status.signal() {
            return 128 + signo;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(root: &TempDir) -> LockConfig {
        LockConfig {
            parallelism: 1,
            stale_timeout: Duration::from_secs(3600),
            acquire_timeout: Duration::from_millis(500),
            session_override: Some("run-test".to_string()),
            enabled: true,
            debug: false,
            lock_root: root.path().to_path_buf(),
            project_dir: None,
        }
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn propagates_exit_code_and_releases() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        let code = run(&config, "test", None, &sh("exit 3")).unwrap();
        assert_eq!(code, 3);

        let manager = LockManager::from_config(&config);
        assert!(manager.store().read_slot(0).is_none());
    }

    #[test]
    fn command_sees_slot_held() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        let slot = LockManager::from_config(&config)
            .store()
            .paths()
            .slot_file(0);
        let script = format!("test -f '{}'", slot.display());
        assert_eq!(run(&config, "test", None, &sh(&script)).unwrap(), 0);
    }

    #[test]
    fn missing_program_is_an_error_and_releases() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        let err = run(
            &config,
            "test",
            None,
            &["/definitely/not/a/program".to_string()],
        )
        .unwrap_err();
        assert!(err.contains("Failed to spawn"));
        assert!(LockManager::from_config(&config)
            .store()
            .read_slot(0)
            .is_none());
    }

    #[test]
    fn timeout_is_reported_as_error() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        let manager = LockManager::from_config(&config);
        let _held = manager.acquire_guard("holder", None).unwrap();

        let err = run(&config, "waiter", None, &sh("exit 0")).unwrap_err();
        assert!(err.contains("timed out"));
    }

    #[test]
    fn disabled_runs_without_lock_dir() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.enabled = false;
        assert_eq!(run(&config, "test", None, &sh("exit 0")).unwrap(), 0);
        assert!(!temp.path().join("hookgate-slots").exists());
    }
}
