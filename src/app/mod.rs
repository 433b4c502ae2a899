//! Application core: the run protocol, free of direct I/O.
//!
//! The controller talks to pins and the clock only through the **port
//! traits** in [`ports`], so the whole run lifecycle is testable with
//! recording mocks and a fake clock.  Leases are plain files and are used
//! directly.

pub mod commands;
pub mod controller;
pub mod events;
pub mod ports;
