//! Actuator drivers.

pub mod shift_register;
