//! Delay gate: a `DELAY` file that vetoes new runs until a local time.
//!
//! The body is the expiration as `YYYY-MM-DD HH:MM`.  The first reader
//! that finds the gate expired or unreadable deletes it, so a stale or
//! corrupt file never blocks watering for good.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, TimeDelta};
use log::{info, warn};

use crate::error::{ConfigError, Error, Result};

/// Fixed file name of the gate inside the state directory.
pub const DELAY_FILE_NAME: &str = "DELAY";

/// Expiration timestamp layout inside the gate file.
pub const DELAY_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Runs are vetoed until `until`.
    Active {
        until: NaiveDateTime,
        remaining: TimeDelta,
    },
    Inactive,
}

impl GateStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

#[derive(Debug, Clone)]
pub struct DelayGate {
    path: PathBuf,
}

impl DelayGate {
    /// Gate file inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(DELAY_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Report whether the gate vetoes a run at `now`.
    ///
    /// Absent → `Inactive`.  Expiration strictly after `now` → `Active`,
    /// file untouched.  Expired or unparsable → file deleted, `Inactive`.
    pub fn check_and_consume(&self, now: NaiveDateTime) -> Result<GateStatus> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(GateStatus::Inactive),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("delay gate: {} is not text, removing", self.path.display());
                self.clear()?;
                return Ok(GateStatus::Inactive);
            }
            Err(e) => return Err(Error::io(&self.path, e)),
        };

        let Ok(until) = NaiveDateTime::parse_from_str(body.trim(), DELAY_FORMAT) else {
            warn!("delay gate: could not read date {:?}, removing", body.trim());
            self.clear()?;
            return Ok(GateStatus::Inactive);
        };

        if until > now {
            Ok(GateStatus::Active {
                until,
                remaining: until - now,
            })
        } else {
            info!("delay gate: expired at {}, removing", until.format(DELAY_FORMAT));
            self.clear()?;
            Ok(GateStatus::Inactive)
        }
    }

    /// Veto runs until `until` (minute precision).
    pub fn set_until(&self, until: NaiveDateTime) -> Result<()> {
        let body = until.format(DELAY_FORMAT).to_string();
        fs::write(&self.path, &body).map_err(|e| Error::io(&self.path, e))?;
        info!("delay gate: set until {}", body);
        Ok(())
    }

    /// Veto runs for `hours` from `now`.  Returns the expiration written.
    pub fn set_for_hours(&self, now: NaiveDateTime, hours: u32) -> Result<NaiveDateTime> {
        let until = now
            .checked_add_signed(TimeDelta::hours(i64::from(hours)))
            .ok_or(ConfigError::ValidationFailed(
                "delay hours reach past the supported date range",
            ))?;
        self.set_until(until)?;
        Ok(until)
    }

    /// Remove the gate.  Returns `false` if there was none.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }
}

/// Operator-facing remaining-delay text: minutes up to an hour, hours beyond.
pub fn describe_remaining(remaining: TimeDelta) -> String {
    let minutes = remaining.num_minutes();
    if minutes > 60 {
        format!("{:.1} more hours", minutes as f64 / 60.0)
    } else {
        format!("{minutes} more minutes")
    }
}
