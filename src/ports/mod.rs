//! Port traits (interfaces)
//!
//! These traits define the boundaries between the core domain and external I/O.
//! Adapters implement these traits to connect to real hardware.

pub mod keyer;
pub mod radio;
pub mod serial;

pub use keyer::*;
pub use radio::*;
pub use serial::*;
