//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements       | Connects to                      |
//! |------------|------------------|----------------------------------|
//! | `gpio`     | OutputPin        | GPIO character device / sim pins |
//! | `log_sink` | `log::Log`       | `log.txt` in the state directory |
//! | `time`     | Clock            | OS wall clock                    |

pub mod gpio;
pub mod log_sink;
pub mod time;
