//! Controller states and run outcomes.

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta};

/// Where a [`StationController`](super::controller::StationController) is
/// in its single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    /// A delay gate vetoed the run.  Terminal for this process.
    Gated,
    Running {
        station: u8,
        deadline: DateTime<Local>,
    },
    /// Cleanup has started or finished.
    Terminating,
}

/// How a run request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The station ran until its deadline and was switched off.
    Completed { station: u8, minutes: u32 },

    /// The delay gate was active; nothing ran.
    Gated {
        until: NaiveDateTime,
        remaining: TimeDelta,
    },

    /// Station 0 was requested; everything is off.
    AllOff,

    /// A termination signal arrived before the deadline.
    Interrupted { station: u8 },
}
