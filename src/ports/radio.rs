//! Radio board port traits
//!
//! Split into two traits:
//! - `RadioDriver`: board discovery, library lifecycle, channel lookup
//! - `RadioChannel`: per-channel RF parameters and path control

use crate::domain::{BoardInfo, ChannelKind, Direction, Frequency, OokResult};

/// Trait for the board-level radio driver
pub trait RadioDriver {
    /// Look for a connected board
    fn detect_board(&mut self) -> OokResult<BoardInfo>;

    /// Bring up the driver library
    fn initialize(&mut self) -> OokResult<()>;

    /// Borrow one of the board's channels
    fn channel(&mut self, kind: ChannelKind) -> OokResult<&mut dyn RadioChannel>;

    /// Release the board
    fn close(&mut self) -> OokResult<()>;
}

/// Trait for a single radio channel
pub trait RadioChannel {
    fn set_frequency(&mut self, freq: Frequency) -> OokResult<()>;

    fn set_tx_power(&mut self, dbm: i32) -> OokResult<()>;

    fn set_tx_bandwidth(&mut self, hz: f64) -> OokResult<()>;

    fn set_sample_rate_cutoff(&mut self, hz: f64) -> OokResult<()>;

    /// Activate or deactivate the RX or TX path
    fn activate(&mut self, direction: Direction, active: bool) -> OokResult<()>;

    /// Select the TX output: `cw` on emits an unmodulated carrier,
    /// both off selects the (silent) IQ path
    fn set_cw_outputs(&mut self, lo_out: bool, cw_out: bool) -> OokResult<()>;
}
