//! Lock configuration resolved from environment overrides.
//!
//! Every override is optional and parsed leniently: a missing, empty or malformed
//! value falls back to the built-in default. Resolution never fails.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const PARALLELISM_ENV: &str = "HOOKGATE_PARALLELISM";
pub const STALE_TIMEOUT_ENV: &str = "HOOKGATE_STALE_TIMEOUT_MS";
pub const ACQUIRE_TIMEOUT_ENV: &str = "HOOKGATE_ACQUIRE_TIMEOUT_MS";
pub const SESSION_ID_ENV: &str = "HOOKGATE_SESSION_ID";
pub const DISABLE_ENV: &str = "HOOKGATE_NO_LOCK";
pub const DEBUG_ENV: &str = "HOOKGATE_DEBUG";
pub const LOCK_ROOT_ENV: &str = "HOOKGATE_LOCK_ROOT";
pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

pub const DEFAULT_STALE_TIMEOUT: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Resolved settings for one lock manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockConfig {
    /// Pool capacity, always >= 1.
    pub parallelism: usize,
    pub stale_timeout: Duration,
    pub acquire_timeout: Duration,
    /// Explicit session key, used verbatim instead of the derived one.
    pub session_override: Option<String>,
    /// False when `HOOKGATE_NO_LOCK` is set.
    pub enabled: bool,
    pub debug: bool,
    /// Directory under which the `hookgate-slots/` namespace lives.
    pub lock_root: PathBuf,
    /// Project directory used for session derivation. `None` means the current dir.
    pub project_dir: Option<PathBuf>,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            stale_timeout: DEFAULT_STALE_TIMEOUT,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            session_override: None,
            enabled: true,
            debug: false,
            lock_root: env::temp_dir(),
            project_dir: None,
        }
    }
}

impl LockConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            parallelism: lookup(PARALLELISM_ENV)
                .and_then(|v| parse_positive(&v))
                .map(|n| n as usize)
                .unwrap_or(defaults.parallelism),
            stale_timeout: lookup(STALE_TIMEOUT_ENV)
                .and_then(|v| parse_positive(&v))
                .map(Duration::from_millis)
                .unwrap_or(defaults.stale_timeout),
            acquire_timeout: lookup(ACQUIRE_TIMEOUT_ENV)
                .and_then(|v| parse_positive(&v))
                .map(Duration::from_millis)
                .unwrap_or(defaults.acquire_timeout),
            session_override: lookup(SESSION_ID_ENV).filter(|v| !v.trim().is_empty()),
            enabled: !lookup(DISABLE_ENV).is_some_and(|v| is_truthy(&v)),
            debug: lookup(DEBUG_ENV).is_some_and(|v| is_truthy(&v)),
            lock_root: lookup(LOCK_ROOT_ENV)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.lock_root),
            project_dir: lookup(PROJECT_DIR_ENV)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Project directory for session derivation, falling back to the current dir.
    pub fn resolved_project_dir(&self) -> PathBuf {
        self.project_dir
            .clone()
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Half the logical CPU count, never less than one.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

/// Whether locking is active for this process.
pub fn is_locking_enabled() -> bool {
    !env::var(DISABLE_ENV).is_ok_and(|v| is_truthy(&v))
}

fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}
