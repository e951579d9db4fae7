//! OOK transmitter
//!
//! Turns a '0'/'1' bitstream into a timed sequence of carrier-on / carrier-off
//! intervals and issues them to a radio front-end.
//!
//! ## Architecture (Hexagonal / Ports & Adapters)
//!
//! - `domain/` - Pure domain types, no I/O dependencies
//! - `ports/` - Trait definitions (interfaces) for keyers, radios, serial ports
//! - `ook/` - Keying core: loader, run-length encoder, timing, driver
//! - `adapters/` - Implementations of ports (CW channel keyer, serial line keyer, mock radio)
//! - `session` - Board bring-up around one transmission
//! - `profiles` - Saved configuration profiles
//! - `cli` - Command line front-end

// Core domain (pure, no I/O)
pub mod domain;
pub mod ook;
pub mod ports;

// Adapters (external I/O)
pub mod adapters;

// Driving side
pub mod cli;
pub mod profiles;
pub mod session;

use clap::Parser;

use domain::OokResult;

/// Parse the command line and run the selected command
pub fn run() -> OokResult<()> {
    let cli = cli::Cli::parse();
    cli::execute(cli)
}
