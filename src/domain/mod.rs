//! Core domain types
//!
//! Pure types with no I/O dependencies: symbols, transmission lifecycle,
//! RF parameters, timing configuration and errors.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
