//! Foundation module - Core utilities shared by every subsystem
//!
//! - Logging setup over the `log` facade
//! - Monotonic clocks used by the frame-rate display

pub mod logging;
pub mod time;
