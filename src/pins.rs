//! GPIO pin assignments for the shift-register station board.
//!
//! Single source of truth for the default wiring.  Numbers are BCM line
//! offsets on the Pi's main GPIO chip.  A config file can override any of
//! them through [`PinAssignment`](crate::config::PinAssignment).

/// GPIO character device the lines live on.
pub const GPIO_CHIP: &str = "/dev/gpiochip0";

// ---------------------------------------------------------------------------
// 74HC595-style shift register
// ---------------------------------------------------------------------------

/// Serial clock (SRCLK).  Data is captured on the rising edge.
pub const SR_CLOCK_GPIO: u32 = 4;
/// Output enable, active LOW.  HIGH blanks every station output.
pub const SR_OUTPUT_ENABLE_GPIO: u32 = 17;
/// Storage latch (RCLK).  Rising edge commits shifted bits to the outputs.
pub const SR_LATCH_GPIO: u32 = 22;
/// Serial data, revision 1 boards.
pub const SR_DATA_GPIO: u32 = 21;
/// Serial data, revision 2 boards (pin 21 was renumbered).
pub const SR_DATA_GPIO_REV2: u32 = 27;

/// Data pin for a given board revision.
pub const fn data_pin_for_revision(revision: u8) -> u32 {
    if revision == 2 {
        SR_DATA_GPIO_REV2
    } else {
        SR_DATA_GPIO
    }
}
