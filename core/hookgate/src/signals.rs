//! SIGINT/SIGTERM capture for the supervising loop.
//!
//! The handler only records the signal number; the supervisor polls it, kills
//! the child and reaps our slots from ordinary code.

use std::sync::atomic::{AtomicI32, Ordering};

static RECEIVED: AtomicI32 = AtomicI32::new(0);

#[cfg(unix)]
extern "C" fn record_signal(signo: libc::c_int) {
    RECEIVED.store(signo, Ordering::SeqCst);
}

pub fn install() {
    #[cfg(unix)]
    {
        let handler = record_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        // SAFETY: the handler only performs an atomic store, which is async-signal-safe.
        #[allow(unsafe_code)]
        unsafe {
            libc::signal(libc::SIGINT, handler);
            libc::signal(libc::SIGTERM, handler);
        }
    }
}

/// The signal received since `install`, if any.
pub fn received() -> Option<i32> {
    match RECEIVED.load(Ordering::SeqCst) {
        0 => None,
        signo => Some(signo),
    }
}
