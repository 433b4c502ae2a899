//! Sprinkler station controller library.
//!
//! Drives one irrigation station at a time through a shift register and
//! keeps the crash-safety protocol around it: a per-process run lock, a
//! delay gate that vetoes runs, and a watchdog sweep that forces the
//! hardware off when a controller died mid-run.
//!
//! The binaries in `src/main.rs` and `src/bin/` are thin wrappers over
//! these modules.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod lease;
pub mod signals;
pub mod station;
pub mod sweep;

pub mod adapters;
pub mod drivers;

mod pins;

pub use error::{Error, Result};
