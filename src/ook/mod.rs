//! On-off keying core
//!
//! Pipeline: bitstream text → symbols → runs → timed keying.
//!
//! - `loader`: text to symbols (lenient, only '0'/'1' count)
//! - `rle`: symbols to alternating runs
//! - `timing`: run length to hold duration
//! - `wait`: cancellable holds
//! - `driver`: the keying loop and its unconditional shutdown
//! - `bits`: binary data to and from bitstrings
//! - `payload`: chunked frames with the cyclic prefix

pub mod bits;
pub mod driver;
pub mod loader;
pub mod payload;
pub mod rle;
pub mod timing;
pub mod wait;

pub use driver::{transmit, KeyerErrorPolicy, TransmitReport, Transmitter};
pub use loader::{load_symbols, load_symbols_from_path, parse_symbols};
pub use payload::{Chunk, ChunkKind, Frame, FrameHeader};
pub use rle::{encode_runs, Run, RunList};
pub use timing::TimingPolicy;
pub use wait::{cancellation, CancelHandle, Cancellation, HoldOutcome, ThreadWait, Wait};
