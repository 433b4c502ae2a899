//! Station controller: one bounded run per process.
//!
//! ```text
//!              gate active                    station 0
//!   Idle ─────────────────▶ Gated      Idle ───────────▶ (cleanup)
//!    │
//!    │ operate_station(s, m)
//!    ▼
//!   Running(s, deadline) ──deadline──▶ Idle
//!    │
//!    │ stop flag / error / drop
//!    ▼
//!   Terminating  (all-off, own lock removed, pins released)
//! ```
//!
//! [`shutdown`](StationController::shutdown) is the exit hook.  It runs
//! from `Drop` too, so an early return or a panic unwinding through the
//! controller still leaves every station off.  Termination signals are
//! turned into the stop flag the run loop polls.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use log::{debug, error, info, warn};

use crate::config::StationConfig;
use crate::error::{Error, HardwareError, Result};
use crate::lease::delay_gate::describe_remaining;
use crate::lease::{DelayGate, GateStatus, RunLockDir};
use crate::station::StationVector;

use super::commands::RunRequest;
use super::events::{ControllerState, RunOutcome};
use super::ports::{Clock, StationOutputs};

pub struct StationController<O: StationOutputs, C: Clock> {
    config: StationConfig,
    outputs: O,
    clock: C,
    locks: RunLockDir,
    gate: DelayGate,
    pid: u32,
    state: ControllerState,
    shut_down: bool,
}

impl<O: StationOutputs, C: Clock> StationController<O, C> {
    /// Take exclusive ownership of the (already initialised) outputs.
    ///
    /// Leases live in `state_dir`; the run lock is named after this
    /// process's id.
    pub fn new(config: StationConfig, outputs: O, clock: C, state_dir: &Path) -> Self {
        Self {
            config,
            outputs,
            clock,
            locks: RunLockDir::new(state_dir),
            gate: DelayGate::in_dir(state_dir),
            pid: std::process::id(),
            state: ControllerState::Idle,
            shut_down: false,
        }
    }

    /// Override the lock owner id.
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    // ── Entry point ───────────────────────────────────────────

    /// Honour the delay gate, then carry out `request`.
    ///
    /// Gated and all-off requests run the full cleanup before returning.
    /// A completed or interrupted run leaves cleanup to [`shutdown`].
    pub fn execute(&mut self, request: RunRequest, stop: &AtomicBool) -> Result<RunOutcome> {
        let now = self.clock.now();
        if let GateStatus::Active { until, remaining } =
            self.gate.check_and_consume(now.naive_local())?
        {
            info!(
                "Found DELAY file, aborting operations ({}).",
                describe_remaining(remaining)
            );
            self.state = ControllerState::Gated;
            self.shutdown()?;
            return Ok(RunOutcome::Gated { until, remaining });
        }

        match request {
            RunRequest::AllOff => self.all_off(),
            RunRequest::Run { station, minutes } => {
                self.operate_station(u32::from(station), minutes, stop)
            }
        }
    }

    // ── Run ───────────────────────────────────────────────────

    /// Energise `station` for `minutes`, blocking until the deadline.
    ///
    /// Bounds are checked before any pin is touched.  Station 0 takes the
    /// all-off path and never creates a run lock.
    pub fn operate_station(
        &mut self,
        station: u32,
        minutes: u32,
        stop: &AtomicBool,
    ) -> Result<RunOutcome> {
        let (station, minutes) = match RunRequest::validate(&self.config, station, Some(minutes))? {
            RunRequest::AllOff => return self.all_off(),
            RunRequest::Run { station, minutes } => (station, minutes),
        };
        if self.state != ControllerState::Idle || self.outputs.is_released() {
            return Err(HardwareError::Released.into());
        }

        if stop.load(Ordering::Relaxed) {
            warn!("Stop requested before station {} started.", station);
            self.state = ControllerState::Terminating;
            return Ok(RunOutcome::Interrupted { station });
        }

        let n = self.config.number_of_stations;
        info!("Operating station {} for {} minutes.", station, minutes);
        self.outputs.write(&StationVector::single(n, station))?;
        self.locks.create(self.pid, station)?;

        let deadline = self.clock.now() + TimeDelta::minutes(i64::from(minutes));
        self.state = ControllerState::Running { station, deadline };

        if !self.wait_until(deadline, stop) {
            warn!("Stop requested, ending station {} early.", station);
            self.state = ControllerState::Terminating;
            return Ok(RunOutcome::Interrupted { station });
        }

        self.outputs.write(&StationVector::all_off(n))?;
        self.locks.remove(self.pid)?;
        self.state = ControllerState::Idle;
        info!("Finished operating station {}.", station);
        Ok(RunOutcome::Completed { station, minutes })
    }

    /// Sleep-poll until `deadline`.  Returns `false` if `stop` was raised first.
    fn wait_until(&self, deadline: DateTime<Local>, stop: &AtomicBool) -> bool {
        let slice = Duration::from_secs(self.config.poll_interval_secs);
        loop {
            let now = self.clock.now();
            if now >= deadline {
                return true;
            }
            if stop.load(Ordering::Relaxed) {
                return false;
            }
            let remaining = (deadline - now).to_std().unwrap_or(Duration::ZERO);
            self.clock.sleep(remaining.min(slice));
        }
    }

    fn all_off(&mut self) -> Result<RunOutcome> {
        info!("Received all off command.");
        self.shutdown()?;
        Ok(RunOutcome::AllOff)
    }

    // ── Exit hook ─────────────────────────────────────────────

    /// Drive every station off, delete this process's run lock and release
    /// the pins.
    ///
    /// Every step is attempted even if an earlier one fails; the first
    /// failure is returned.  Safe to call any number of times.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            debug!("cleanup already done");
        } else {
            info!("Running cleanup.");
        }
        if !matches!(self.state, ControllerState::Gated) {
            self.state = ControllerState::Terminating;
        }

        let mut first: Option<Error> = None;
        if !self.outputs.is_released() {
            info!("Turning off all stations.");
            let off = StationVector::all_off(self.config.number_of_stations);
            if let Err(e) = self.outputs.write(&off) {
                error!("cleanup: all-off write failed: {}", e);
                first = first.or(Some(e.into()));
            }
        }
        if let Err(e) = self.locks.remove(self.pid) {
            error!("cleanup: {}", e);
            first = first.or(Some(e));
        }
        if let Err(e) = self.outputs.release() {
            error!("cleanup: pin release failed: {}", e);
            first = first.or(Some(e.into()));
        }
        self.shut_down = true;

        first.map_or(Ok(()), Err)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// In-memory image of the station outputs.
    pub fn status(&self) -> &StationVector {
        self.outputs.status()
    }

    pub fn locks(&self) -> &RunLockDir {
        &self.locks
    }
}

impl<O: StationOutputs, C: Clock> Drop for StationController<O, C> {
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }
        if let Err(e) = self.shutdown() {
            error!("cleanup on drop failed: {}", e);
        }
    }
}
