//! Controller configuration parameters
//!
//! Set once when a process starts and never mutated afterwards.
//! Values can be overridden by a `sprinkler.json` file in the state
//! directory; any field left out takes its default.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};
use crate::pins;

/// Name of the optional config file inside the state directory.
pub const CONFIG_FILE_NAME: &str = "sprinkler.json";

/// Hard ceiling on stations; one shift-register chain of 8 boards.
pub const MAX_SUPPORTED_STATIONS: u8 = 64;

/// Environment variable naming the state directory.
pub const STATE_DIR_ENV: &str = "SPRINKLER_DIR";

/// Where leases, the log and the config file live when `--dir` is not given:
/// `$SPRINKLER_DIR`, else the directory holding the executable.
pub fn default_state_dir() -> std::io::Result<PathBuf> {
    if let Some(dir) = std::env::var_os(STATE_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf))
}

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    // --- Stations ---
    /// Number of physical output channels on the shift-register chain
    pub number_of_stations: u8,
    /// Longest a single run may last.  Also the base of the stale-lease threshold.
    pub max_minutes_per_station: u32,

    // --- Watchdog ---
    /// Buffer added to `max_minutes_per_station` before a run lock is stale
    pub grace_minutes: u32,

    // --- Timing ---
    /// How often the run loop wakes to compare the clock with the deadline
    pub poll_interval_secs: u64,

    // --- Diagnostics ---
    /// Echo log lines to stdout and enable debug-level records
    pub debug: bool,

    /// Control-line wiring
    pub pins: PinAssignment,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            number_of_stations: 8,
            max_minutes_per_station: 30,
            grace_minutes: 5,
            poll_interval_secs: 1,
            debug: false,
            pins: PinAssignment::default(),
        }
    }
}

impl StationConfig {
    /// Load `sprinkler.json` from `dir`, or defaults when the file is absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        let config = match fs::read_to_string(&path) {
            Ok(text) => {
                debug!("config: loading {}", path.display());
                serde_json::from_str::<Self>(&text)
                    .map_err(|e| ConfigError::Malformed(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(Error::io(path, e)),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the controller unsafe to run.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.number_of_stations == 0 {
            return Err(ConfigError::ValidationFailed(
                "number_of_stations must be at least 1",
            ));
        }
        if self.number_of_stations > MAX_SUPPORTED_STATIONS {
            return Err(ConfigError::ValidationFailed(
                "number_of_stations must be at most 64",
            ));
        }
        if self.max_minutes_per_station == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_minutes_per_station must be at least 1",
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_secs must be at least 1",
            ));
        }
        self.pins.validate()
    }

    /// Age in minutes beyond which a run lock is considered abandoned.
    pub fn stale_after_minutes(&self) -> u32 {
        self.max_minutes_per_station
            .saturating_add(self.grace_minutes)
    }
}

/// Line offsets of the four shift-register control pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinAssignment {
    /// GPIO character device path
    pub chip: String,
    pub clock: u32,
    /// Active-low output enable
    pub output_enable: u32,
    pub latch: u32,
    pub data: u32,
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self::for_board_revision(1)
    }
}

impl PinAssignment {
    /// Stock wiring for a given board revision.
    pub fn for_board_revision(revision: u8) -> Self {
        Self {
            chip: pins::GPIO_CHIP.to_string(),
            clock: pins::SR_CLOCK_GPIO,
            output_enable: pins::SR_OUTPUT_ENABLE_GPIO,
            latch: pins::SR_LATCH_GPIO,
            data: pins::data_pin_for_revision(revision),
        }
    }

    /// Move only the data line to where `revision` boards wire it.
    pub fn set_board_revision(&mut self, revision: u8) {
        self.data = pins::data_pin_for_revision(revision);
    }

    fn validate(&self) -> core::result::Result<(), ConfigError> {
        let all = [self.clock, self.output_enable, self.latch, self.data];
        for (i, a) in all.iter().enumerate() {
            if all[i + 1..].contains(a) {
                return Err(ConfigError::ValidationFailed(
                    "shift-register pins must be distinct",
                ));
            }
        }
        Ok(())
    }
}
