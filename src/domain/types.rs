//! Core domain types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{OokError, OokResult};

/// One binary symbol of the bitstream. `On` keys the carrier, `Off` releases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Symbol {
    Off = 0,
    On = 1,
}

impl Symbol {
    /// Map a bitstream byte to a symbol. Anything other than `'0'`/`'1'` is not a symbol.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(Symbol::Off),
            b'1' => Some(Symbol::On),
            _ => None,
        }
    }

    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Symbol::On
        } else {
            Symbol::Off
        }
    }

    pub fn is_on(self) -> bool {
        self == Symbol::On
    }

    /// The opposite symbol (on → off, off → on)
    pub fn flipped(self) -> Self {
        match self {
            Symbol::On => Symbol::Off,
            Symbol::Off => Symbol::On,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::On => '1',
            Symbol::Off => '0',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Ordered sequence of symbols, one byte of storage per symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSequence(Vec<Symbol>);

impl SymbolSequence {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, symbol: Symbol) {
        self.0.push(symbol);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<Symbol> {
        self.0.first().copied()
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.iter().copied()
    }

    /// Render as a `'0'`/`'1'` bitstring
    pub fn to_bitstring(&self) -> String {
        self.0.iter().map(|s| s.as_char()).collect()
    }
}

impl FromIterator<Symbol> for SymbolSequence {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Symbol>> for SymbolSequence {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }
}

/// Lifecycle of a single transmission request.
///
/// ```text
/// Idle --configure--> Configured --transmit--> Keying --loop ends--> Stopping --forced off--> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransmissionState {
    #[default]
    Idle,
    Configured,
    Keying,
    Stopping,
}

impl TransmissionState {
    pub fn can_transition_to(self, next: TransmissionState) -> bool {
        use TransmissionState::*;
        matches!(
            (self, next),
            (Idle, Configured)
                | (Configured, Keying)
                | (Configured, Idle)
                | (Keying, Stopping)
                | (Stopping, Idle)
        )
    }

    /// Move to `next`, rejecting edges the lifecycle does not allow.
    pub fn transition(self, next: TransmissionState) -> OokResult<TransmissionState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(OokError::Config(format!(
                "Illegal transmission state change {self:?} -> {next:?}"
            )))
        }
    }
}

/// Frequency in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frequency(pub f64);

impl Frequency {
    pub fn hz(hz: f64) -> Self {
        Self(hz)
    }

    pub fn mhz(mhz: f64) -> Self {
        Self(mhz * 1_000_000.0)
    }

    pub fn as_hz(&self) -> f64 {
        self.0
    }
}

/// Radio front-end channel. `S1g` covers sub-1 GHz, `Hif` covers 1 GHz and up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    S1g,
    Hif,
}

impl ChannelKind {
    pub fn name(self) -> &'static str {
        match self {
            ChannelKind::S1g => "s1g",
            ChannelKind::Hif => "hif",
        }
    }
}

impl std::str::FromStr for ChannelKind {
    type Err = OokError;

    fn from_str(s: &str) -> OokResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s1g" => Ok(ChannelKind::S1g),
            "hif" => Ok(ChannelKind::Hif),
            other => Err(OokError::Config(format!(
                "Unknown channel '{other}', expected 's1g' or 'hif'"
            ))),
        }
    }
}

/// Direction of a radio channel path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rx,
    Tx,
}

/// Identity of a detected radio board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardInfo {
    pub name: String,
    pub hardware_version: u32,
    pub uuid: String,
    pub serial_number: u32,
}

/// Information about a serial port
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialPortInfo {
    pub name: String,
    pub port_type: String,
}

/// Serial modem control line used to key a transmitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlLine {
    #[default]
    Rts,
    Dtr,
}
