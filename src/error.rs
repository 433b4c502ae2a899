//! Unified error types for the sprinkler controller.
//!
//! Three families, matching how each is handled:
//!
//! - [`ConfigError`]: bad station index, excessive duration, invalid
//!   config file.  Always raised before any pin is touched.
//! - [`HardwareError`]: a pin could not be configured or written.  Fatal;
//!   the controller's exit path does a best-effort reset.
//! - I/O errors on the lease files (run locks, delay gate).

use core::fmt;
use std::io;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible library operation funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// Caller or configuration error, detected pre-hardware.
    Config(ConfigError),
    /// Pin I/O failed.
    Hardware(HardwareError),
    /// A lease file could not be read, written or removed.
    Io { path: PathBuf, source: io::Error },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Station index outside `0..=number_of_stations`.
    StationOutOfRange { station: u32, max: u8 },
    /// Duration outside `1..=max_minutes_per_station`.
    MinutesOutOfRange { minutes: u32, max: u32 },
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// The config file could not be parsed.
    Malformed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StationOutOfRange { max, .. } => write!(
                f,
                "station number must be 1-{max}, use 0 to turn everything off"
            ),
            Self::MinutesOutOfRange { minutes, max } if *minutes == 0 => {
                write!(f, "minutes must be at least 1 (maximum allowed is {max})")
            }
            Self::MinutesOutOfRange { max, .. } => {
                write!(f, "maximum minutes allowed is {max}")
            }
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

/// Which shift-register control line an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Clock,
    Latch,
    Data,
    OutputEnable,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock => write!(f, "clock"),
            Self::Latch => write!(f, "latch"),
            Self::Data => write!(f, "data"),
            Self::OutputEnable => write!(f, "output-enable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareError {
    /// Requesting a pin as an output failed.
    PinSetup { pin: u32, reason: String },
    /// Driving a control line high or low failed.
    PinWrite { line: Line, reason: String },
    /// The vector length does not match the configured station count.
    VectorLength { expected: usize, got: usize },
    /// The pins were already handed back to the OS.
    Released,
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinSetup { pin, reason } => write!(f, "pin {pin} setup failed: {reason}"),
            Self::PinWrite { line, reason } => write!(f, "{line} line write failed: {reason}"),
            Self::VectorLength { expected, got } => {
                write!(f, "station vector has {got} entries, expected {expected}")
            }
            Self::Released => write!(f, "pins already released"),
        }
    }
}

impl std::error::Error for HardwareError {}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
