//! Configuration profiles
//!
//! A Configuration is a saved profile with the RF parameters and the keying
//! timing used for a particular radio setup.

use serde::{Deserialize, Serialize};

use super::{ChannelKind, Frequency, OokError, OokResult};

/// Highest sample-rate cutoff the front-end accepts (4 MHz)
pub const MAX_SAMPLE_RATE_HZ: f64 = 4_000_000.0;
/// Widest TX bandwidth the front-end accepts (2.5 MHz)
pub const MAX_BANDWIDTH_HZ: f64 = 2_500_000.0;
/// Highest TX power in dBm
pub const MAX_POWER_DBM: i32 = 14;
/// Boundary between the sub-1 GHz and high-frequency channels
pub const HIF_THRESHOLD_HZ: f64 = 1_000_000_000.0;

fn default_base_unit_us() -> u64 {
    1000
}

fn default_single_run_factor() -> f64 {
    2.1
}

fn default_multiple_run_factor() -> f64 {
    2.5
}

/// Keying timing. Factors were obtained empirically against the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Duration of one symbol-equivalent in microseconds
    #[serde(default = "default_base_unit_us")]
    pub base_unit_us: u64,
    /// Multiplier for isolated symbols (run length 1)
    #[serde(default = "default_single_run_factor")]
    pub single_run_factor: f64,
    /// Multiplier for runs longer than one symbol
    #[serde(default = "default_multiple_run_factor")]
    pub multiple_run_factor: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            base_unit_us: default_base_unit_us(),
            single_run_factor: default_single_run_factor(),
            multiple_run_factor: default_multiple_run_factor(),
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> OokResult<()> {
        if self.base_unit_us == 0 {
            return Err(OokError::Config("base unit must be positive".into()));
        }
        for (name, factor) in [
            ("single run factor", self.single_run_factor),
            ("multiple run factor", self.multiple_run_factor),
        ] {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(OokError::Config(format!(
                    "{name} must be a positive number, got {factor}"
                )));
            }
        }
        Ok(())
    }
}

/// RF parameters applied to the channel before keying starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxParams {
    pub channel: ChannelKind,
    pub frequency_hz: f64,
    pub bandwidth_hz: f64,
    pub power_dbm: i32,
    pub sample_rate_hz: f64,
}

impl Default for TxParams {
    fn default() -> Self {
        Self {
            channel: ChannelKind::S1g,
            frequency_hz: 868_000_000.0,
            bandwidth_hz: 1_000_000.0,
            power_dbm: 0,
            sample_rate_hz: 4_000_000.0,
        }
    }
}

impl TxParams {
    pub fn frequency(&self) -> Frequency {
        Frequency::hz(self.frequency_hz)
    }

    /// Check the parameters against the front-end limits before any hardware is touched.
    pub fn validate(&self) -> OokResult<()> {
        if !(self.sample_rate_hz > 0.0 && self.sample_rate_hz <= MAX_SAMPLE_RATE_HZ) {
            return Err(OokError::Config(format!(
                "sample rate {} Hz outside (0, {MAX_SAMPLE_RATE_HZ}] Hz",
                self.sample_rate_hz
            )));
        }
        if !(self.bandwidth_hz > 0.0 && self.bandwidth_hz <= MAX_BANDWIDTH_HZ) {
            return Err(OokError::Config(format!(
                "bandwidth {} Hz outside (0, {MAX_BANDWIDTH_HZ}] Hz",
                self.bandwidth_hz
            )));
        }
        if self.power_dbm > MAX_POWER_DBM {
            return Err(OokError::Config(format!(
                "TX power {} dBm exceeds {MAX_POWER_DBM} dBm",
                self.power_dbm
            )));
        }
        if !(self.frequency_hz.is_finite() && self.frequency_hz > 0.0) {
            return Err(OokError::Config(format!(
                "invalid TX frequency {} Hz",
                self.frequency_hz
            )));
        }
        match self.channel {
            ChannelKind::S1g if self.frequency_hz >= HIF_THRESHOLD_HZ => {
                Err(OokError::Config(format!(
                    "{} Hz is above 1 GHz, use the 'hif' channel",
                    self.frequency_hz
                )))
            }
            ChannelKind::Hif if self.frequency_hz < HIF_THRESHOLD_HZ => {
                Err(OokError::Config(format!(
                    "{} Hz is below 1 GHz, use the 's1g' channel",
                    self.frequency_hz
                )))
            }
            _ => Ok(()),
        }
    }
}

/// A saved configuration profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Profile name (e.g., "868 MHz bench", "Field 2.4 GHz")
    pub name: String,
    #[serde(default)]
    pub tx: TxParams,
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            tx: TxParams::default(),
            timing: TimingConfig::default(),
        }
    }
}
