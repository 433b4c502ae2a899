//! Watchdog sweep.
//!
//! Runs as its own short-lived process on a periodic trigger, with no
//! shared memory with any controller.  It looks for run locks older than
//! `max_minutes_per_station + grace_minutes`; such a lock means the
//! controller that wrote it crashed or hung with a station possibly still
//! energised.
//!
//! ## Sweep lifecycle
//!
//! 1. List every run lock in the state directory.
//! 2. No stale lock → return.  No pins are opened in this case.
//! 3. Otherwise open a fresh driver, latch all-off, release the pins.
//! 4. Delete exactly the stale locks.  Younger locks are left alone even
//!    when several exist; that anomaly is only logged.
//!
//! If the reset fails the stale locks are kept so the next sweep retries.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{Clock, StationOutputs};
use crate::config::StationConfig;
use crate::error::Result;
use crate::lease::run_lock::remove_lock_file;
use crate::lease::{RunLock, RunLockDir};
use crate::station::StationVector;

/// What one sweep saw and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Run locks present when the sweep started.
    pub locks_found: usize,
    /// Locks past the staleness threshold.
    pub stale: Vec<RunLock>,
    /// Whether the all-off reset was driven.
    pub reset_performed: bool,
    /// Lock files actually deleted.
    pub deleted: Vec<PathBuf>,
}

pub struct WatchdogSweep<C: Clock> {
    config: StationConfig,
    locks: RunLockDir,
    clock: C,
}

impl<C: Clock> WatchdogSweep<C> {
    pub fn new(config: StationConfig, state_dir: &Path, clock: C) -> Self {
        Self {
            config,
            locks: RunLockDir::new(state_dir),
            clock,
        }
    }

    /// Run one sweep.  `open_outputs` is only called when a reset is needed.
    pub fn run<O, F>(&self, open_outputs: F) -> Result<SweepReport>
    where
        O: StationOutputs,
        F: FnOnce() -> Result<O>,
    {
        let now = self.clock.now();
        let threshold = self.config.stale_after_minutes();
        let all = self.locks.list()?;

        let mut report = SweepReport {
            locks_found: all.len(),
            ..SweepReport::default()
        };

        if all.len() > 1 {
            warn!(
                "{} run locks present: more than one controller has been running",
                all.len()
            );
        }

        report.stale = all
            .into_iter()
            .filter(|l| l.is_stale(now, threshold))
            .collect();

        if report.stale.is_empty() {
            info!("No old run locks found.");
            return Ok(report);
        }

        for lock in &report.stale {
            warn!(
                "Stale run lock {}: station {}, {} minutes old (limit {}), owner {}",
                lock.path.display(),
                lock.station
                    .map_or_else(|| "?".to_string(), |s| s.to_string()),
                lock.age(now).num_minutes(),
                threshold,
                if process_alive(lock.pid) { "still alive" } else { "gone" },
            );
        }

        let mut outputs = open_outputs()?;
        info!("Turning off all stations.");
        let written = outputs.write(&StationVector::all_off(self.config.number_of_stations));
        let released = outputs.release();
        written?;
        released?;
        report.reset_performed = true;

        for lock in &report.stale {
            if remove_lock_file(&lock.path)? {
                info!("Deleting file: {}", lock.path.display());
                report.deleted.push(lock.path.clone());
            }
        }
        Ok(report)
    }
}

/// Whether a process with `pid` exists (`kill(pid, 0)`).
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return false;
    }
    // SAFETY: signal 0 performs the permission and existence check only.
    let rc = unsafe { libc::kill(pid, 0) };
    if rc == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}
