//! Port traits: the boundary between the run protocol and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ StationController / sweep (domain)
//! ```
//!
//! The shift-register driver implements [`StationOutputs`]; the system
//! clock implements [`Clock`].  The controller and the sweep consume them
//! via generics, so both are testable with recording mocks and a fake clock.

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::error::HardwareError;
use crate::station::StationVector;

// ───────────────────────────────────────────────────────────────
// Station outputs (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port over the physical station channels.
pub trait StationOutputs {
    /// Push `vector` onto the outputs.  The vector length must match the
    /// configured station count.
    fn write(&mut self, vector: &StationVector) -> Result<(), HardwareError>;

    /// Last vector written, mirroring the physical state.
    fn status(&self) -> &StationVector;

    /// Hand the pins back to the OS.  Calling it twice is a no-op.
    fn release(&mut self) -> Result<(), HardwareError>;

    /// Whether [`release`](Self::release) has run.
    fn is_released(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time plus a way to wait.
///
/// Deadlines, lock ages and delay expirations are all local wall-clock
/// values, the same timeline the delay file is written in.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}
