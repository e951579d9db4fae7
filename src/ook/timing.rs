//! Timing policy: run length to hold duration
//!
//! hold = length × base unit × factor, where the factor is the single-run
//! factor for isolated symbols and the multiple-run factor otherwise. An
//! isolated symbol needs proportionally less settling margin than a longer
//! block. Two tiers only; finer tuning means adding tiers here.

use std::time::Duration;

use crate::domain::{OokError, OokResult, TimingConfig};

use super::rle::RunList;

/// Validated timing policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingPolicy {
    config: TimingConfig,
}

impl TimingPolicy {
    /// Validate `config`. Both tiers must give a representable hold.
    pub fn new(config: TimingConfig) -> OokResult<Self> {
        config.validate()?;
        let policy = Self { config };
        policy.hold(1)?;
        policy.hold(2)?;
        Ok(policy)
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Multiplier applied to a run of `length` symbols
    pub fn factor(&self, length: usize) -> f64 {
        if length == 1 {
            self.config.single_run_factor
        } else {
            self.config.multiple_run_factor
        }
    }

    /// How long a run of `length` symbols keeps the carrier in its state.
    ///
    /// Fails with [`OokError::Config`] when the hold does not fit in a
    /// `Duration` of whole nanoseconds.
    pub fn hold(&self, length: usize) -> OokResult<Duration> {
        let micros = length as f64 * self.config.base_unit_us as f64 * self.factor(length);
        let nanos = (micros * 1_000.0).round();
        // u64::MAX rounds up to 2^64 as f64, so the bound is exclusive
        if !(nanos.is_finite() && nanos < u64::MAX as f64) {
            return Err(OokError::Config(format!(
                "hold for a run of {length} symbols at {} us per symbol is out of range",
                self.config.base_unit_us
            )));
        }
        Ok(Duration::from_nanos(nanos as u64))
    }

    /// Total time needed to key every run in `runs`
    pub fn airtime(&self, runs: &RunList) -> OokResult<Duration> {
        runs.iter().try_fold(Duration::ZERO, |total, run| {
            total
                .checked_add(self.hold(run.length())?)
                .ok_or_else(|| OokError::Config("total airtime is out of range".into()))
        })
    }
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            config: TimingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_single_and_multiple_holds() {
        let policy = TimingPolicy::default();
        assert_eq!(policy.hold(1).unwrap(), Duration::from_micros(2_100));
        assert_eq!(policy.hold(2).unwrap(), Duration::from_micros(5_000));
        assert_eq!(policy.hold(3).unwrap(), Duration::from_micros(7_500));
    }

    #[test]
    fn formula_holds_for_custom_config() {
        let policy = TimingPolicy::new(TimingConfig {
            base_unit_us: 400,
            single_run_factor: 1.5,
            multiple_run_factor: 3.0,
        })
        .unwrap();

        for length in 1..=50usize {
            let factor = if length == 1 { 1.5 } else { 3.0 };
            let expected_us = length as f64 * 400.0 * factor;
            let expected = Duration::from_nanos((expected_us * 1_000.0).round() as u64);
            assert_eq!(policy.hold(length).unwrap(), expected, "length {length}");
        }
    }

    #[test]
    fn holds_increase_within_the_multiple_tier() {
        let policy = TimingPolicy::default();
        let holds: Vec<Duration> = (2..200).map(|l| policy.hold(l).unwrap()).collect();
        assert!(holds.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn airtime_sums_run_holds() {
        use crate::ook::loader::parse_symbols;
        use crate::ook::rle::encode_runs;

        let policy = TimingPolicy::default();
        let runs = encode_runs(&parse_symbols("1110100"));
        // 3 + 1 + 1 + 2
        let expected = Duration::from_micros(7_500 + 2_100 + 2_100 + 5_000);
        assert_eq!(policy.airtime(&runs).unwrap(), expected);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = TimingPolicy::new(TimingConfig {
            base_unit_us: 0,
            ..TimingConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn unrepresentable_base_unit_is_rejected() {
        let result = TimingPolicy::new(TimingConfig {
            base_unit_us: u64::MAX,
            ..TimingConfig::default()
        });
        assert!(matches!(result, Err(OokError::Config(_))));
    }

    #[test]
    fn oversized_run_is_an_error_not_a_clamped_hold() {
        let policy = TimingPolicy::new(TimingConfig {
            base_unit_us: 10_000_000,
            ..TimingConfig::default()
        })
        .unwrap();
        assert!(policy.hold(1_000).is_ok());
        assert!(matches!(
            policy.hold(usize::MAX),
            Err(OokError::Config(_))
        ));
    }
}
