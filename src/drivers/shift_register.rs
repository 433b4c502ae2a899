//! Serial-in / parallel-out shift register driver (74HC595 chain).
//!
//! Four control lines: clock, latch, data and an active-low output
//! enable.  A write shifts one bit per station, highest station first,
//! then pulses the latch so all outputs change together.
//!
//! ## Init contract
//!
//! Outputs are blanked *before* the register content is cleared, and only
//! re-enabled once the all-off pattern is latched.  Power-on register
//! content is undefined.
//!
//! ## Dual-target design
//!
//! Generic over [`embedded_hal::digital::OutputPin`]: real character-device
//! lines on the Pi, simulated pins on the host.

use embedded_hal::digital::OutputPin;
use log::{debug, info};

use crate::app::ports::StationOutputs;
use crate::error::{HardwareError, Line};
use crate::station::StationVector;

/// The four control lines, already configured as outputs.
pub struct ShiftPins<P> {
    pub clock: P,
    pub output_enable: P,
    pub latch: P,
    pub data: P,
}

pub struct ShiftRegister<P: OutputPin> {
    pins: Option<ShiftPins<P>>,
    state: StationVector,
}

impl<P: OutputPin> ShiftRegister<P> {
    /// Take ownership of the pins and bring the outputs to a known all-off state.
    pub fn init(pins: ShiftPins<P>, stations: u8) -> Result<Self, HardwareError> {
        let mut sr = Self {
            pins: Some(pins),
            state: StationVector::all_off(stations),
        };
        sr.disable_output()?;
        let off = StationVector::all_off(stations);
        sr.shift_out(&off)?;
        sr.enable_output()?;
        info!("shift register: initialised, {} stations off", stations);
        Ok(sr)
    }

    /// Let the register drive the station outputs.
    pub fn enable_output(&mut self) -> Result<(), HardwareError> {
        let pins = self.pins.as_mut().ok_or(HardwareError::Released)?;
        drive(&mut pins.output_enable, false, Line::OutputEnable)
    }

    /// Blank every station output regardless of register content.
    pub fn disable_output(&mut self) -> Result<(), HardwareError> {
        let pins = self.pins.as_mut().ok_or(HardwareError::Released)?;
        drive(&mut pins.output_enable, true, Line::OutputEnable)
    }

    pub fn stations(&self) -> usize {
        self.state.len()
    }

    fn shift_out(&mut self, vector: &StationVector) -> Result<(), HardwareError> {
        let pins = self.pins.as_mut().ok_or(HardwareError::Released)?;

        drive(&mut pins.clock, false, Line::Clock)?;
        drive(&mut pins.latch, false, Line::Latch)?;

        for bit in vector.shift_order() {
            drive(&mut pins.clock, false, Line::Clock)?;
            drive(&mut pins.data, bit, Line::Data)?;
            drive(&mut pins.clock, true, Line::Clock)?;
        }

        drive(&mut pins.latch, true, Line::Latch)
    }
}

impl<P: OutputPin> StationOutputs for ShiftRegister<P> {
    fn write(&mut self, vector: &StationVector) -> Result<(), HardwareError> {
        if vector.len() != self.state.len() {
            return Err(HardwareError::VectorLength {
                expected: self.state.len(),
                got: vector.len(),
            });
        }
        self.shift_out(vector)?;
        self.state = vector.clone();
        debug!("shift register: latched {}", vector);
        Ok(())
    }

    fn status(&self) -> &StationVector {
        &self.state
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        if self.pins.take().is_some() {
            debug!("shift register: pins released");
        }
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.pins.is_none()
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool, line: Line) -> Result<(), HardwareError> {
    let res = if high { pin.set_high() } else { pin.set_low() };
    res.map_err(|e| HardwareError::PinWrite {
        line,
        reason: format!("{e:?}"),
    })
}
