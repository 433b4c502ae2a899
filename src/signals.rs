//! Termination signals → stop flag.
//!
//! SIGINT, SIGTERM and SIGHUP would otherwise kill the controller without
//! unwinding, skipping the exit hook and leaving a station energised until
//! the next watchdog sweep.  The handlers only set a static flag; the run
//! loop polls it between sleeps and takes the normal cleanup path.
//!
//! SIGKILL cannot be caught.  That case is what the watchdog sweep is for.

use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

/// Monotonic: once raised, never lowered.
static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_termination(_sig: libc::c_int) {
    STOP_REQUESTED.store(true, Ordering::Relaxed);
}

/// Route SIGINT, SIGTERM and SIGHUP to the stop flag.
pub fn install() -> std::io::Result<()> {
    for sig in [libc::SIGINT, libc::SIGTERM, libc::SIGHUP] {
        // SAFETY: the handler only performs an atomic store, which is
        // async-signal-safe.
        let prev = unsafe {
            libc::signal(
                sig,
                on_termination as extern "C" fn(libc::c_int) as libc::sighandler_t,
            )
        };
        if prev == libc::SIG_ERR {
            return Err(std::io::Error::last_os_error());
        }
    }
    debug!("signals: termination handlers installed");
    Ok(())
}

/// The process-wide stop flag polled by the run loop.
pub fn stop_flag() -> &'static AtomicBool {
    &STOP_REQUESTED
}
