//! Mock radio adapter for development and testing without hardware.
//!
//! Select it with `--radio mock`:
//!
//!   RUST_LOG=ook_tx_lib=info ook-tx transmit bitstream.txt --radio mock
//!
//! Every driver and channel call is logged at INFO level and recorded, so you
//! can verify exactly what a real board would have been asked to do.

use crate::domain::{BoardInfo, ChannelKind, Direction, Frequency, OokError, OokResult};
use crate::ports::{RadioChannel, RadioDriver};

/// A call made on a [`MockChannel`]
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Frequency(f64),
    TxPower(i32),
    TxBandwidth(f64),
    SampleRateCutoff(f64),
    Activate(Direction, bool),
    CwOutputs { lo: bool, cw: bool },
}

/// In-memory radio channel
pub struct MockChannel {
    kind: ChannelKind,
    events: Vec<ChannelEvent>,
    cw_calls: usize,
    fail_cw_at: Option<usize>,
    fail_tx_activation: bool,
    carrier_on: bool,
    tx_active: bool,
}

impl MockChannel {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            events: Vec::new(),
            cw_calls: 0,
            fail_cw_at: None,
            fail_tx_activation: false,
            carrier_on: false,
            tx_active: false,
        }
    }

    /// Make the `call`-th `set_cw_outputs` (0-based) fail
    pub fn with_cw_failure_at(mut self, call: usize) -> Self {
        self.fail_cw_at = Some(call);
        self
    }

    /// Make every attempt to activate the TX path fail
    pub fn with_tx_activation_failure(mut self) -> Self {
        self.fail_tx_activation = true;
        self
    }

    pub fn events(&self) -> &[ChannelEvent] {
        &self.events
    }

    /// True while the CW carrier is enabled and TX is active
    pub fn carrier_on(&self) -> bool {
        self.carrier_on && self.tx_active
    }

    pub fn tx_active(&self) -> bool {
        self.tx_active
    }

    fn record(&mut self, event: ChannelEvent) {
        log::info!("[MOCK RADIO] {}: {event:?}", self.kind.name());
        self.events.push(event);
    }
}

impl RadioChannel for MockChannel {
    fn set_frequency(&mut self, freq: Frequency) -> OokResult<()> {
        self.record(ChannelEvent::Frequency(freq.as_hz()));
        Ok(())
    }

    fn set_tx_power(&mut self, dbm: i32) -> OokResult<()> {
        self.record(ChannelEvent::TxPower(dbm));
        Ok(())
    }

    fn set_tx_bandwidth(&mut self, hz: f64) -> OokResult<()> {
        self.record(ChannelEvent::TxBandwidth(hz));
        Ok(())
    }

    fn set_sample_rate_cutoff(&mut self, hz: f64) -> OokResult<()> {
        self.record(ChannelEvent::SampleRateCutoff(hz));
        Ok(())
    }

    fn activate(&mut self, direction: Direction, active: bool) -> OokResult<()> {
        self.record(ChannelEvent::Activate(direction, active));
        if direction == Direction::Tx && active && self.fail_tx_activation {
            return Err(OokError::Radio(format!(
                "{}: TX activation rejected",
                self.kind.name()
            )));
        }
        if direction == Direction::Tx {
            self.tx_active = active;
        }
        Ok(())
    }

    fn set_cw_outputs(&mut self, lo_out: bool, cw_out: bool) -> OokResult<()> {
        let call = self.cw_calls;
        self.cw_calls += 1;
        self.record(ChannelEvent::CwOutputs {
            lo: lo_out,
            cw: cw_out,
        });
        if self.fail_cw_at == Some(call) {
            return Err(OokError::Radio(format!(
                "{}: CW output change {call} rejected",
                self.kind.name()
            )));
        }
        self.carrier_on = cw_out;
        Ok(())
    }
}

/// In-memory board with an S1G and a HIF channel
pub struct MockRadio {
    board: Option<BoardInfo>,
    initialized: bool,
    closed: bool,
    s1g: MockChannel,
    hif: MockChannel,
}

impl MockRadio {
    pub fn new() -> Self {
        let board = BoardInfo {
            name: "Mock OOK board".to_string(),
            hardware_version: 1,
            uuid: "00000000-0000-0000-0000-000000000000".to_string(),
            serial_number: 0x0000_0001,
        };
        log::info!("[MOCK RADIO] Initialized board '{}'", board.name);
        Self {
            board: Some(board),
            initialized: false,
            closed: false,
            s1g: MockChannel::new(ChannelKind::S1g),
            hif: MockChannel::new(ChannelKind::Hif),
        }
    }

    /// A driver that finds no board
    pub fn without_board() -> Self {
        Self {
            board: None,
            ..Self::new()
        }
    }

    /// Make the `call`-th CW output change on `kind` fail
    pub fn with_cw_failure_at(mut self, kind: ChannelKind, call: usize) -> Self {
        let channel = self.channel_mut(kind);
        channel.fail_cw_at = Some(call);
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn mock_channel(&self, kind: ChannelKind) -> &MockChannel {
        match kind {
            ChannelKind::S1g => &self.s1g,
            ChannelKind::Hif => &self.hif,
        }
    }

    fn channel_mut(&mut self, kind: ChannelKind) -> &mut MockChannel {
        match kind {
            ChannelKind::S1g => &mut self.s1g,
            ChannelKind::Hif => &mut self.hif,
        }
    }
}

impl Default for MockRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioDriver for MockRadio {
    fn detect_board(&mut self) -> OokResult<BoardInfo> {
        log::info!("[MOCK RADIO] DETECT BOARD");
        self.board
            .clone()
            .ok_or_else(|| OokError::Radio("No board detected".into()))
    }

    fn initialize(&mut self) -> OokResult<()> {
        if self.board.is_none() {
            return Err(OokError::Radio("Cannot initialize: no board".into()));
        }
        log::info!("[MOCK RADIO] INIT");
        self.initialized = true;
        self.closed = false;
        Ok(())
    }

    fn channel(&mut self, kind: ChannelKind) -> OokResult<&mut dyn RadioChannel> {
        if !self.initialized {
            return Err(OokError::Radio(format!(
                "Cannot get {} channel: driver not initialized",
                kind.name()
            )));
        }
        Ok(self.channel_mut(kind))
    }

    fn close(&mut self) -> OokResult<()> {
        log::info!("[MOCK RADIO] CLOSE");
        self.initialized = false;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_requires_initialization() {
        let mut radio = MockRadio::new();
        assert!(radio.channel(ChannelKind::S1g).is_err());
        radio.detect_board().unwrap();
        radio.initialize().unwrap();
        assert!(radio.channel(ChannelKind::S1g).is_ok());
    }

    #[test]
    fn missing_board_fails_detection_and_init() {
        let mut radio = MockRadio::without_board();
        assert!(radio.detect_board().is_err());
        assert!(radio.initialize().is_err());
    }

    #[test]
    fn close_uninitializes() {
        let mut radio = MockRadio::new();
        radio.initialize().unwrap();
        radio.close().unwrap();
        assert!(radio.is_closed());
        assert!(!radio.is_initialized());
    }

    #[test]
    fn channel_calls_are_recorded_per_channel() {
        let mut radio = MockRadio::new();
        radio.initialize().unwrap();
        radio
            .channel(ChannelKind::Hif)
            .unwrap()
            .set_frequency(Frequency::mhz(2400.0))
            .unwrap();
        assert_eq!(
            radio.mock_channel(ChannelKind::Hif).events(),
            &[ChannelEvent::Frequency(2.4e9)]
        );
        assert!(radio.mock_channel(ChannelKind::S1g).events().is_empty());
    }

    #[test]
    fn carrier_needs_cw_and_tx() {
        let mut channel = MockChannel::new(ChannelKind::S1g);
        channel.set_cw_outputs(false, true).unwrap();
        assert!(!channel.carrier_on());
        channel.activate(Direction::Tx, true).unwrap();
        assert!(channel.carrier_on());
    }
}
