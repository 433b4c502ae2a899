//! Board GPIO adapter: claims the four shift-register lines.
//!
//! - **`feature = "gpiocdev"`**: lines requested from the Linux GPIO
//!   character device via `gpiocdev-embedded-hal`.  Dropping a pin hands
//!   the line back to the kernel.
//! - **otherwise**: [`SimPin`], an in-memory pin for host builds and tests.
//!
//! The output-enable line is claimed first and driven HIGH from the moment
//! it is requested, so nothing reaches the stations while the remaining
//! lines are configured.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use log::{debug, trace};

use crate::config::StationConfig;
use crate::drivers::shift_register::{ShiftPins, ShiftRegister};
use crate::error::HardwareError;

/// In-memory output pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimPin {
    offset: u32,
}

impl SimPin {
    pub fn new(offset: u32, initial: PinState) -> Self {
        trace!("gpio(sim): line {} starts {:?}", offset, initial);
        Self { offset }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        trace!("gpio(sim): line {} low", self.offset);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        trace!("gpio(sim): line {} high", self.offset);
        Ok(())
    }
}

#[cfg(feature = "gpiocdev")]
pub type BoardPin = gpiocdev_embedded_hal::OutputPin;

#[cfg(not(feature = "gpiocdev"))]
pub type BoardPin = SimPin;

pub type BoardShiftRegister = ShiftRegister<BoardPin>;

/// Claim the control lines and run the shift-register init sequence.
pub fn open_shift_register(config: &StationConfig) -> Result<BoardShiftRegister, HardwareError> {
    let p = &config.pins;
    let output_enable = request_output(&p.chip, p.output_enable, PinState::High)?;
    let clock = request_output(&p.chip, p.clock, PinState::Low)?;
    let data = request_output(&p.chip, p.data, PinState::Low)?;
    let latch = request_output(&p.chip, p.latch, PinState::Low)?;
    debug!(
        "gpio: {} clk={} oe={} lat={} dat={}",
        p.chip, p.clock, p.output_enable, p.latch, p.data
    );

    ShiftRegister::init(
        ShiftPins {
            clock,
            output_enable,
            latch,
            data,
        },
        config.number_of_stations,
    )
}

#[cfg(feature = "gpiocdev")]
fn request_output(chip: &str, offset: u32, initial: PinState) -> Result<BoardPin, HardwareError> {
    gpiocdev_embedded_hal::OutputPin::new(chip, offset, initial).map_err(|e| {
        HardwareError::PinSetup {
            pin: offset,
            reason: format!("{e:?}"),
        }
    })
}

#[cfg(not(feature = "gpiocdev"))]
fn request_output(_chip: &str, offset: u32, initial: PinState) -> Result<BoardPin, HardwareError> {
    debug!("gpio(sim): line {} as output", offset);
    Ok(SimPin::new(offset, initial))
}
