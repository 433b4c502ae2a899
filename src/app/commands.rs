//! Inbound run requests.
//!
//! A [`RunRequest`] only exists once its bounds have been checked against
//! the [`StationConfig`], so nothing downstream re-validates before
//! touching pins.

use crate::config::StationConfig;
use crate::error::ConfigError;

/// What the external scheduler asked this process to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRequest {
    /// Station 0: turn everything off and exit.
    AllOff,

    /// Energise one station for a bounded number of minutes.
    Run { station: u8, minutes: u32 },
}

impl RunRequest {
    /// Check `station` against `0..=N` and `minutes` against `1..=max`.
    ///
    /// Minutes may be omitted for the all-off sentinel; when given they are
    /// checked either way.
    pub fn validate(
        config: &StationConfig,
        station: u32,
        minutes: Option<u32>,
    ) -> Result<Self, ConfigError> {
        let n = config.number_of_stations;
        if station > u32::from(n) {
            return Err(ConfigError::StationOutOfRange { station, max: n });
        }

        let max = config.max_minutes_per_station;
        if let Some(m) = minutes {
            if m == 0 || m > max {
                return Err(ConfigError::MinutesOutOfRange { minutes: m, max });
            }
        }

        if station == 0 {
            return Ok(Self::AllOff);
        }
        let minutes = minutes.ok_or(ConfigError::MinutesOutOfRange { minutes: 0, max })?;
        Ok(Self::Run {
            station: station as u8,
            minutes,
        })
    }
}
