//! Integration tests: full session on the mock radio
//!
//! Board detection, RF configuration, CW keying through `CwKeyer` and the
//! unconditional close, exercised against `MockRadio`.

use std::thread;
use std::time::{Duration, Instant};

use ook_tx_lib::adapters::mock_radio::{ChannelEvent, MockRadio};
use ook_tx_lib::domain::{ChannelKind, Direction, OokError, TimingConfig, TxParams};
use ook_tx_lib::ook::{
    cancellation, parse_symbols, Cancellation, HoldOutcome, KeyerErrorPolicy, TimingPolicy,
    Transmitter, Wait,
};
use ook_tx_lib::session::run_session;

struct NoWait;

impl Wait for NoWait {
    fn hold(&mut self, _duration: Duration, _cancel: &Cancellation) -> HoldOutcome {
        HoldOutcome::Elapsed
    }
}

fn transmitter() -> Transmitter<NoWait> {
    Transmitter::new(TimingPolicy::default()).with_wait(NoWait)
}

fn cw_states(events: &[ChannelEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|e| match e {
            ChannelEvent::CwOutputs { cw, .. } => Some(*cw),
            _ => None,
        })
        .collect()
}

/// The CW output follows the bitstream runs, then the final shutdown disables it.
#[test]
fn cw_output_follows_runs() {
    let mut radio = MockRadio::new();
    let mut tx = transmitter();

    run_session(&mut radio, &TxParams::default(), &parse_symbols("1100101"), &mut tx).unwrap();

    let events = radio.mock_channel(ChannelKind::S1g).events();
    // 5 runs (1,0,1,0,1) then the forced shutdown
    assert_eq!(cw_states(events), vec![true, false, true, false, true, false]);
    assert_eq!(
        events.last(),
        Some(&ChannelEvent::Activate(Direction::Tx, false))
    );
    assert!(radio.is_closed());
}

/// HIF parameters land on the HIF channel only.
#[test]
fn hif_channel_is_selected() {
    let mut radio = MockRadio::new();
    let mut tx = transmitter();
    let params = TxParams {
        channel: ChannelKind::Hif,
        frequency_hz: 2.45e9,
        ..TxParams::default()
    };

    run_session(&mut radio, &params, &parse_symbols("1"), &mut tx).unwrap();

    assert!(radio.mock_channel(ChannelKind::S1g).events().is_empty());
    assert_eq!(
        radio.mock_channel(ChannelKind::Hif).events()[0],
        ChannelEvent::Frequency(2.45e9)
    );
}

/// Abort policy stops after the failing run; the carrier still ends up off.
#[test]
fn abort_policy_on_radio_failure() {
    let mut radio = MockRadio::new().with_cw_failure_at(ChannelKind::S1g, 0);
    let mut tx = transmitter().with_error_policy(KeyerErrorPolicy::Abort);

    let err = run_session(&mut radio, &TxParams::default(), &parse_symbols("1010"), &mut tx)
        .unwrap_err();

    assert!(matches!(err, OokError::Keyer { index: 0, .. }));
    let events = radio.mock_channel(ChannelKind::S1g).events();
    // failed key-on, then the shutdown
    assert_eq!(cw_states(events), vec![true, false]);
    assert!(!radio.mock_channel(ChannelKind::S1g).carrier_on());
    assert!(radio.is_closed());
}

/// Real-time wait cancelled from another thread mid-hold: shutdown happens,
/// Cancelled is reported.
#[test]
fn cancelled_session_releases_carrier() {
    let (handle, token) = cancellation();
    let mut radio = MockRadio::new();
    // first run holds for 7.5 s
    let policy = TimingPolicy::new(TimingConfig {
        base_unit_us: 1_000_000,
        ..TimingConfig::default()
    })
    .unwrap();
    let mut tx = Transmitter::new(policy).with_cancellation(token);

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        handle.cancel()
    });
    let start = Instant::now();
    let err = run_session(&mut radio, &TxParams::default(), &parse_symbols("111000"), &mut tx)
        .unwrap_err();
    assert!(canceller.join().unwrap());
    assert!(start.elapsed() < Duration::from_secs(5));

    assert!(matches!(err, OokError::Cancelled { index: 0 }));
    assert!(!radio.mock_channel(ChannelKind::S1g).carrier_on());
    assert!(radio.is_closed());
}
