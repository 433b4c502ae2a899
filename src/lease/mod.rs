//! Filesystem leases shared between controller processes.
//!
//! Plain files, not a transactional store: existence is checked and then
//! acted on, with no lock primitive in between.  What keeps stations from
//! running forever is the watchdog sweep reclaiming abandoned run locks.

pub mod delay_gate;
pub mod run_lock;

pub use delay_gate::{DelayGate, GateStatus};
pub use run_lock::{RunLock, RunLockDir};
