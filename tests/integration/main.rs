//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters and a temporary state directory.  All tests run
//! on the host with no real GPIO required.

mod controller_tests;
mod delay_gate_tests;
mod sweep_tests;
