//! System clock adapter.
//!
//! Local wall-clock time from the OS and a blocking thread sleep.  The
//! run loop sleeps in short slices, so a wall-clock step (NTP sync on a
//! Pi without an RTC) is picked up at the next poll.

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::app::ports::Clock;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
