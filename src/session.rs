//! TX session: the sequential bring-up around one transmission
//!
//! 1. Validate RF parameters (nothing touches hardware before this passes)
//! 2. Detect the board and initialize the driver
//! 3. Borrow the requested channel and apply frequency, power, bandwidth and
//!    sample-rate cutoff, deactivate RX (Idle → Configured)
//! 4. Key the symbols through a `CwKeyer` on that channel
//! 5. Close the driver, whatever happened in 3 and 4

use crate::adapters::CwKeyer;
use crate::domain::{BoardInfo, Direction, OokResult, SymbolSequence, TxParams};
use crate::ook::{TransmitReport, Transmitter, Wait};
use crate::ports::{RadioChannel, RadioDriver};

/// Outcome of a full session
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub board: BoardInfo,
    pub transmit: TransmitReport,
}

/// Run one transmission on `driver` with the given RF parameters.
pub fn run_session<D, W>(
    driver: &mut D,
    params: &TxParams,
    symbols: &SymbolSequence,
    transmitter: &mut Transmitter<W>,
) -> OokResult<SessionReport>
where
    D: RadioDriver + ?Sized,
    W: Wait,
{
    params.validate()?;

    let board = driver.detect_board()?;
    log::info!(
        "Detected board: {} (hw v{}, uuid {}, s/n {:08X})",
        board.name,
        board.hardware_version,
        board.uuid,
        board.serial_number
    );
    driver.initialize()?;

    let result = configure_and_key(driver, params, symbols, transmitter);

    if let Err(close_err) = driver.close() {
        log::warn!("Failed to close radio: {close_err}");
        if result.is_ok() {
            return Err(close_err);
        }
    }

    result.map(|transmit| SessionReport { board, transmit })
}

fn configure_and_key<D, W>(
    driver: &mut D,
    params: &TxParams,
    symbols: &SymbolSequence,
    transmitter: &mut Transmitter<W>,
) -> OokResult<TransmitReport>
where
    D: RadioDriver + ?Sized,
    W: Wait,
{
    let channel = driver.channel(params.channel)?;
    apply_params(channel, params)?;
    transmitter.mark_configured()?;
    log::info!(
        "Channel {} configured: {:.3} MHz, {} dBm, {:.0} Hz BW, {:.0} Hz SR",
        params.channel.name(),
        params.frequency_hz / 1e6,
        params.power_dbm,
        params.bandwidth_hz,
        params.sample_rate_hz
    );

    let mut keyer = CwKeyer::new(channel);
    transmitter.transmit(symbols, &mut keyer)
}

/// Apply RF parameters to a channel and leave its RX path off
pub fn apply_params(channel: &mut dyn RadioChannel, params: &TxParams) -> OokResult<()> {
    channel.set_frequency(params.frequency())?;
    channel.set_tx_power(params.power_dbm)?;
    channel.set_tx_bandwidth(params.bandwidth_hz)?;
    channel.set_sample_rate_cutoff(params.sample_rate_hz)?;
    channel.activate(Direction::Rx, false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_radio::{ChannelEvent, MockRadio};
    use crate::domain::{ChannelKind, OokError, TransmissionState};
    use crate::ook::{parse_symbols, Cancellation, HoldOutcome, TimingPolicy};
    use std::time::Duration;

    struct NoWait;

    impl Wait for NoWait {
        fn hold(&mut self, _duration: Duration, _cancel: &Cancellation) -> HoldOutcome {
            HoldOutcome::Elapsed
        }
    }

    fn transmitter() -> Transmitter<NoWait> {
        Transmitter::new(TimingPolicy::default()).with_wait(NoWait)
    }

    #[test]
    fn configures_then_keys_then_closes() {
        let mut radio = MockRadio::new();
        let mut tx = transmitter();

        let report = run_session(&mut radio, &TxParams::default(), &parse_symbols("10"), &mut tx).unwrap();

        assert_eq!(report.transmit.runs, 2);
        assert!(radio.is_closed());
        assert_eq!(tx.state(), TransmissionState::Idle);

        let events = radio.mock_channel(ChannelKind::S1g).events();
        assert_eq!(events[0], ChannelEvent::Frequency(868e6));
        assert_eq!(events[1], ChannelEvent::TxPower(0));
        assert_eq!(events[2], ChannelEvent::TxBandwidth(1e6));
        assert_eq!(events[3], ChannelEvent::SampleRateCutoff(4e6));
        // configured channel has RX off before the first key
        assert_eq!(events[4], ChannelEvent::Activate(Direction::Rx, false));
        assert_eq!(
            events.last(),
            Some(&ChannelEvent::Activate(Direction::Tx, false))
        );
    }

    #[test]
    fn invalid_params_never_touch_hardware() {
        let mut radio = MockRadio::new();
        let mut tx = transmitter();
        let params = TxParams {
            power_dbm: 20,
            ..TxParams::default()
        };

        let err = run_session(&mut radio, &params, &parse_symbols("1"), &mut tx).unwrap_err();

        assert!(matches!(err, OokError::Config(_)));
        assert!(!radio.is_initialized());
        assert!(radio.mock_channel(ChannelKind::S1g).events().is_empty());
    }

    #[test]
    fn missing_board_is_a_radio_error() {
        let mut radio = MockRadio::without_board();
        let mut tx = transmitter();
        let err = run_session(&mut radio, &TxParams::default(), &parse_symbols("1"), &mut tx).unwrap_err();
        assert!(matches!(err, OokError::Radio(_)));
    }

    #[test]
    fn keyer_failure_still_closes_the_driver() {
        // CW change 1 is the key-off of run 1
        let mut radio = MockRadio::new().with_cw_failure_at(ChannelKind::S1g, 1);
        let mut tx = transmitter();

        let err = run_session(&mut radio, &TxParams::default(), &parse_symbols("101"), &mut tx).unwrap_err();

        assert!(matches!(err, OokError::Keyer { index: 1, .. }));
        assert!(radio.is_closed());
        assert!(!radio.mock_channel(ChannelKind::S1g).carrier_on());
    }
}
