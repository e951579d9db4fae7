//! Transmission driver: keys the carrier run by run
//!
//! For every run the driver asserts or releases the carrier through the
//! [`Keyer`], holds for the duration the [`TimingPolicy`] gives that run, then
//! flips the keyed value. The flip matches the next run because adjacent runs
//! never share a value.
//!
//! Whatever happens inside the loop (normal end, keyer failure, cancellation)
//! the driver finishes with `force_off()`: that shutdown is unconditional.
//!
//! Lifecycle: `Configured -> Keying -> Stopping -> Idle`.

use std::time::Duration;

use crate::domain::{OokError, OokResult, SymbolSequence, TimingConfig, TransmissionState};
use crate::ports::Keyer;

use super::rle::{encode_runs, RunList};
use super::timing::TimingPolicy;
use super::wait::{Cancellation, HoldOutcome, ThreadWait, Wait};

/// What to do with the remaining runs after a keyer call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyerErrorPolicy {
    /// Record the failure and keep keying the remaining runs
    #[default]
    Continue,
    /// Stop keying and go straight to the shutdown
    Abort,
}

/// Summary of a completed transmission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransmitReport {
    /// Number of symbols in the source sequence
    pub symbols: usize,
    /// Number of runs keyed or attempted
    pub runs: usize,
    /// Runs whose `set_output` call succeeded
    pub keyed_runs: usize,
    /// Total time the carrier was asserted
    pub on_time: Duration,
    /// Total time spent holding
    pub total_hold: Duration,
}

/// Runs one transmission at a time against a borrowed keyer.
pub struct Transmitter<W = ThreadWait> {
    timing: TimingPolicy,
    error_policy: KeyerErrorPolicy,
    cancel: Cancellation,
    wait: W,
    state: TransmissionState,
}

impl Transmitter<ThreadWait> {
    pub fn new(timing: TimingPolicy) -> Self {
        Self {
            timing,
            error_policy: KeyerErrorPolicy::default(),
            cancel: Cancellation::never(),
            wait: ThreadWait,
            state: TransmissionState::Idle,
        }
    }
}

impl<W: Wait> Transmitter<W> {
    /// Replace the wait primitive
    pub fn with_wait<V: Wait>(self, wait: V) -> Transmitter<V> {
        Transmitter {
            timing: self.timing,
            error_policy: self.error_policy,
            cancel: self.cancel,
            wait,
            state: self.state,
        }
    }

    pub fn with_error_policy(mut self, policy: KeyerErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> TransmissionState {
        self.state
    }

    pub fn timing(&self) -> &TimingPolicy {
        &self.timing
    }

    pub fn waiter(&self) -> &W {
        &self.wait
    }

    /// Record that RF parameters were applied and the channel is ready.
    pub fn mark_configured(&mut self) -> OokResult<()> {
        self.state = self.state.transition(TransmissionState::Configured)?;
        log::debug!("Transmitter state -> {:?}", self.state);
        Ok(())
    }

    /// Key `symbols` through `keyer`.
    ///
    /// The first keyer failure is returned as [`OokError::Keyer`] after the
    /// shutdown has run. A cancellation is returned as [`OokError::Cancelled`].
    /// Cancel requests only apply to the transmission in progress: any left
    /// pending from before this call are discarded. A run whose hold cannot be
    /// represented fails with [`OokError::Config`] before the keyer is touched.
    pub fn transmit<K: Keyer + ?Sized>(
        &mut self,
        symbols: &SymbolSequence,
        keyer: &mut K,
    ) -> OokResult<TransmitReport> {
        if self.state != TransmissionState::Configured {
            return Err(OokError::Config(format!(
                "transmit requires a configured channel, transmitter is {:?}",
                self.state
            )));
        }

        let stale = self.cancel.clear();
        if stale > 0 {
            log::debug!("Discarded {stale} cancel request(s) sent before this transmission");
        }

        let runs = encode_runs(symbols);
        let holds = runs
            .iter()
            .map(|run| self.timing.hold(run.length()))
            .collect::<OokResult<Vec<Duration>>>()?;
        log::info!(
            "Keying {} symbols in {} runs",
            symbols.len(),
            runs.len()
        );

        self.advance(TransmissionState::Keying);
        let (report, failure) = self.key_runs(symbols.len(), &runs, &holds, keyer);

        self.advance(TransmissionState::Stopping);
        let shutdown = keyer.force_off();
        self.advance(TransmissionState::Idle);

        match (failure, shutdown) {
            (Some(err), Err(shutdown_err)) => {
                log::error!("Shutdown after failed transmission also failed: {shutdown_err}");
                Err(err)
            }
            (Some(err), Ok(())) => Err(err),
            (None, Err(shutdown_err)) => Err(OokError::Shutdown(shutdown_err.to_string())),
            (None, Ok(())) => {
                log::info!(
                    "Transmission complete: {} runs, {:?} on air, {:?} total",
                    report.runs,
                    report.on_time,
                    report.total_hold
                );
                Ok(report)
            }
        }
    }

    fn key_runs<K: Keyer + ?Sized>(
        &mut self,
        symbol_count: usize,
        runs: &RunList,
        holds: &[Duration],
        keyer: &mut K,
    ) -> (TransmitReport, Option<OokError>) {
        let mut report = TransmitReport {
            symbols: symbol_count,
            ..TransmitReport::default()
        };
        let mut failure: Option<OokError> = None;

        let Some(first) = runs.as_slice().first() else {
            return (report, None);
        };
        let mut value = first.value();

        for (index, (run, &hold)) in runs.iter().zip(holds).enumerate() {
            debug_assert_eq!(value, run.value(), "adjacent runs must alternate");

            if self.cancel.is_cancelled() {
                log::warn!("Transmission cancelled before run {index}");
                failure.get_or_insert(OokError::Cancelled { index });
                break;
            }

            report.runs += 1;
            let keyed = match keyer.set_output(value.is_on()) {
                Ok(()) => {
                    report.keyed_runs += 1;
                    true
                }
                Err(e) => {
                    log::warn!("Keyer failed at run {index}: {e}");
                    failure.get_or_insert(OokError::Keyer {
                        index,
                        cause: e.to_string(),
                    });
                    false
                }
            };
            if !keyed && self.error_policy == KeyerErrorPolicy::Abort {
                break;
            }

            log::debug!("run {index}: {value} x{} hold {hold:?}", run.length());

            if self.wait.hold(hold, &self.cancel) == HoldOutcome::Cancelled {
                log::warn!("Transmission cancelled during run {index}");
                failure.get_or_insert(OokError::Cancelled { index });
                break;
            }

            report.total_hold += hold;
            if keyed && value.is_on() {
                report.on_time += hold;
            }

            value = value.flipped();
        }

        (report, failure)
    }

    fn advance(&mut self, next: TransmissionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
        log::debug!("Transmitter state -> {next:?}");
    }
}

/// One-shot transmission with the default real-time wait.
///
/// The caller has already applied RF parameters to the channel behind `keyer`.
pub fn transmit<K: Keyer + ?Sized>(
    symbols: &SymbolSequence,
    timing: &TimingConfig,
    keyer: &mut K,
) -> OokResult<TransmitReport> {
    let mut transmitter = Transmitter::new(TimingPolicy::new(*timing)?);
    transmitter.mark_configured()?;
    transmitter.transmit(symbols, keyer)
}
