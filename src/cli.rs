//! Command line interface
//!
//! Every command that keys hardware loads its input completely before the
//! radio is touched, so an unreadable file never leads to a partial
//! transmission.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::adapters::{LineKeyer, MockRadio, SerialPortFactory};
use crate::domain::{ChannelKind, Configuration, ControlLine, OokError, OokResult, SymbolSequence};
use crate::domain::{TimingConfig, TxParams};
use crate::ook::bits::{load_raw_symbols, symbols_to_bytes, write_bitstring_file};
use crate::ook::payload::{Chunk, ChunkKind, Frame, FrameHeader};
use crate::ook::{
    cancellation, encode_runs, load_symbols_from_path, CancelHandle, KeyerErrorPolicy,
    TimingPolicy, TransmitReport, Transmitter,
};
use crate::ports::SerialFactory;
use crate::profiles;
use crate::session::run_session;

#[derive(Parser, Debug)]
#[command(name = "ook-tx", version, about = "On-off keying transmitter for bitstream files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Key a bitstream on air
    Transmit(TransmitArgs),
    /// Show the runs and holds a bitstream produces, without keying anything
    Plan(PlanArgs),
    /// Write any file as a '0'/'1' bitstring text file
    Encode(EncodeArgs),
    /// Pack a bitstring text file back into bytes (zero padded)
    Decode(DecodeArgs),
    /// List serial ports usable for line keying
    Ports,
    /// Manage configuration profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Bitstream text file ('0'/'1', everything else ignored)
    pub file: PathBuf,
    /// Treat FILE as raw binary and send all of its bits, MSB first
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileSelect {
    /// Profile providing RF and timing defaults
    #[arg(long, default_value = profiles::DEFAULT_PROFILE)]
    pub profile: String,
    /// Directory holding profile JSON files
    #[arg(long, default_value = "profiles")]
    pub profile_dir: PathBuf,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RfArgs {
    /// Radio channel: s1g (< 1 GHz) or hif (>= 1 GHz)
    #[arg(long)]
    pub channel: Option<ChannelKind>,
    /// TX frequency in Hz
    #[arg(long)]
    pub freq_hz: Option<f64>,
    /// TX bandwidth in Hz
    #[arg(long)]
    pub bandwidth_hz: Option<f64>,
    /// TX power in dBm
    #[arg(long, allow_negative_numbers = true)]
    pub power_dbm: Option<i32>,
    /// Sample-rate cutoff in Hz
    #[arg(long)]
    pub sample_rate_hz: Option<f64>,
}

impl RfArgs {
    pub fn apply(&self, tx: &mut TxParams) {
        if let Some(channel) = self.channel {
            tx.channel = channel;
        }
        if let Some(hz) = self.freq_hz {
            tx.frequency_hz = hz;
        }
        if let Some(hz) = self.bandwidth_hz {
            tx.bandwidth_hz = hz;
        }
        if let Some(dbm) = self.power_dbm {
            tx.power_dbm = dbm;
        }
        if let Some(hz) = self.sample_rate_hz {
            tx.sample_rate_hz = hz;
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct TimingArgs {
    /// Duration of one symbol in microseconds
    #[arg(long)]
    pub base_unit_us: Option<u64>,
    /// Hold multiplier for isolated symbols
    #[arg(long)]
    pub single_factor: Option<f64>,
    /// Hold multiplier for runs of two or more symbols
    #[arg(long)]
    pub multiple_factor: Option<f64>,
}

impl TimingArgs {
    pub fn apply(&self, timing: &mut TimingConfig) {
        if let Some(us) = self.base_unit_us {
            timing.base_unit_us = us;
        }
        if let Some(f) = self.single_factor {
            timing.single_run_factor = f;
        }
        if let Some(f) = self.multiple_factor {
            timing.multiple_run_factor = f;
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioKind {
    /// In-memory radio that logs every call
    Mock,
    /// Serial RTS/DTR line keying an external transmitter
    Line,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineArg {
    Rts,
    Dtr,
}

impl From<LineArg> for ControlLine {
    fn from(line: LineArg) -> Self {
        match line {
            LineArg::Rts => ControlLine::Rts,
            LineArg::Dtr => ControlLine::Dtr,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TransmitArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub profile: ProfileSelect,
    #[command(flatten)]
    pub rf: RfArgs,
    #[command(flatten)]
    pub timing: TimingArgs,
    /// Front-end that keys the carrier
    #[arg(long, value_enum, default_value_t = RadioKind::Mock)]
    pub radio: RadioKind,
    /// Serial port for line keying
    #[arg(long)]
    pub port: Option<String>,
    #[arg(long, default_value_t = 9600)]
    pub baud: u32,
    /// Control line used for line keying
    #[arg(long, value_enum, default_value_t = LineArg::Rts)]
    pub line: LineArg,
    /// Key on a released line instead of an asserted one
    #[arg(long)]
    pub active_low: bool,
    /// Stop keying at the first keyer failure instead of finishing the stream
    #[arg(long)]
    pub abort_on_error: bool,
    /// Cancel the transmission after this many seconds
    #[arg(long)]
    pub max_airtime_secs: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub profile: ProfileSelect,
    #[command(flatten)]
    pub timing: TimingArgs,
    /// Number of runs to list
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Wrap the file in a header-carrying frame
    #[arg(long)]
    pub framed: bool,
    /// Leave out the cyclic prefix head and tail of a framed stream
    #[arg(long, requires = "framed")]
    pub no_prefix: bool,
    /// Type tag of the data chunk
    #[arg(long, value_enum, default_value_t = ChunkArg::TextFile)]
    pub chunk: ChunkArg,
    #[arg(long, default_value_t = 0)]
    pub transfer_id: u32,
    #[arg(long, default_value_t = 0)]
    pub spacecraft_id: u32,
    #[arg(long, default_value_t = 0)]
    pub groundstation_id: u32,
    /// Direction field: 0 spacecraft to ground, 1 ground to spacecraft
    #[arg(long, default_value_t = 0)]
    pub direction: u32,
    /// Mark the transfer as acknowledged
    #[arg(long)]
    pub acknowledged: bool,
}

impl EncodeArgs {
    fn header(&self) -> FrameHeader {
        FrameHeader {
            direction: self.direction,
            transmission_mode: u32::from(self.acknowledged),
            transfer_id: self.transfer_id,
            spacecraft_id: self.spacecraft_id,
            groundstation_id: self.groundstation_id,
            ..FrameHeader::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Input is a framed stream; write its first data chunk
    #[arg(long)]
    pub framed: bool,
    /// The framed stream has no cyclic prefix
    #[arg(long, requires = "framed")]
    pub no_prefix: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkArg {
    Telemetry,
    Csv,
    TextFile,
    Json,
    Image,
}

impl From<ChunkArg> for ChunkKind {
    fn from(chunk: ChunkArg) -> Self {
        match chunk {
            ChunkArg::Telemetry => ChunkKind::Telemetry,
            ChunkArg::Csv => ChunkKind::Csv,
            ChunkArg::TextFile => ChunkKind::TextFile,
            ChunkArg::Json => ChunkKind::Json,
            ChunkArg::Image => ChunkKind::Image,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Save a profile built from the defaults plus the given options
    Save {
        name: String,
        #[arg(long, default_value = "profiles")]
        profile_dir: PathBuf,
        #[command(flatten)]
        rf: RfArgs,
        #[command(flatten)]
        timing: TimingArgs,
    },
    /// Print a profile as JSON
    Show {
        name: String,
        #[arg(long, default_value = "profiles")]
        profile_dir: PathBuf,
    },
    /// List saved profiles
    List {
        #[arg(long, default_value = "profiles")]
        profile_dir: PathBuf,
    },
    /// Delete a saved profile
    Delete {
        name: String,
        #[arg(long, default_value = "profiles")]
        profile_dir: PathBuf,
    },
}

pub fn execute(cli: Cli) -> OokResult<()> {
    match cli.command {
        Command::Transmit(args) => transmit_command(args).map(|report| {
            println!(
                "Sent {} symbols in {} runs ({} keyed), {:.3} s on air, {:.3} s total",
                report.symbols,
                report.runs,
                report.keyed_runs,
                report.on_time.as_secs_f64(),
                report.total_hold.as_secs_f64()
            );
        }),
        Command::Plan(args) => plan_command(&args),
        Command::Encode(args) => encode_command(&args),
        Command::Decode(args) => decode_command(&args),
        Command::Ports => {
            for port in SerialPortFactory::list_ports()? {
                println!("{}\t{}", port.name, port.port_type);
            }
            Ok(())
        }
        Command::Profile { action } => profile_command(action),
    }
}

/// Profile values overridden by explicit command line options
pub fn resolve_config(
    profile: &ProfileSelect,
    rf: &RfArgs,
    timing: &TimingArgs,
) -> OokResult<Configuration> {
    let mut config = profiles::load_configuration(&profile.profile_dir, &profile.profile)?;
    rf.apply(&mut config.tx);
    timing.apply(&mut config.timing);
    Ok(config)
}

fn load_source(source: &SourceArgs) -> OokResult<SymbolSequence> {
    if source.raw {
        load_raw_symbols(&source.file)
    } else {
        load_symbols_from_path(&source.file)
    }
}

pub fn transmit_command(args: TransmitArgs) -> OokResult<TransmitReport> {
    let config = resolve_config(&args.profile, &args.rf, &args.timing)?;
    let policy = TimingPolicy::new(config.timing)?;
    config.tx.validate()?;

    let symbols = load_source(&args.source)?;
    let runs = encode_runs(&symbols);
    log::info!(
        "{} symbols, {} runs, estimated airtime {:.3} s",
        symbols.len(),
        runs.len(),
        policy.airtime(&runs)?.as_secs_f64()
    );

    let error_policy = if args.abort_on_error {
        KeyerErrorPolicy::Abort
    } else {
        KeyerErrorPolicy::Continue
    };
    let (cancel_handle, token) = cancellation();
    if let Some(secs) = args.max_airtime_secs {
        spawn_watchdog(cancel_handle.clone(), secs)?;
    }
    let mut transmitter = Transmitter::new(policy)
        .with_error_policy(error_policy)
        .with_cancellation(token);

    let report = match args.radio {
        RadioKind::Mock => {
            let mut radio = MockRadio::new();
            run_session(&mut radio, &config.tx, &symbols, &mut transmitter)?.transmit
        }
        RadioKind::Line => {
            let port = args
                .port
                .as_deref()
                .ok_or_else(|| OokError::Config("--port is required with --radio line".into()))?;
            let serial = SerialPortFactory::open(port, args.baud)?;
            let mut keyer = LineKeyer::new(serial, args.line.into()).with_active_low(args.active_low);
            transmitter.mark_configured()?;
            transmitter.transmit(&symbols, &mut keyer)?
        }
    };
    drop(cancel_handle);
    Ok(report)
}

fn spawn_watchdog(handle: CancelHandle, secs: f64) -> OokResult<()> {
    let limit = Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| OokError::Config(format!("invalid airtime limit {secs} s")))?;
    thread::spawn(move || {
        thread::sleep(limit);
        if handle.cancel() {
            log::warn!("Airtime limit of {limit:?} reached, cancelling");
        }
    });
    Ok(())
}

fn plan_command(args: &PlanArgs) -> OokResult<()> {
    let config = resolve_config(&args.profile, &RfArgs::default(), &args.timing)?;
    let policy = TimingPolicy::new(config.timing)?;
    let symbols = load_source(&args.source)?;
    let runs = encode_runs(&symbols);

    println!("run\tvalue\tlength\thold");
    for (index, run) in runs.iter().take(args.limit).enumerate() {
        println!(
            "{index}\t{}\t{}\t{:?}",
            run.value(),
            run.length(),
            policy.hold(run.length())?
        );
    }
    if runs.len() > args.limit {
        println!("... {} more runs", runs.len() - args.limit);
    }

    let on_time = runs
        .iter()
        .filter(|run| run.value().is_on())
        .map(|run| policy.hold(run.length()))
        .sum::<OokResult<Duration>>()?;
    println!(
        "{} symbols, {} runs, {:.3} s total, {:.3} s on air",
        symbols.len(),
        runs.len(),
        policy.airtime(&runs)?.as_secs_f64(),
        on_time.as_secs_f64()
    );
    Ok(())
}

fn encode_command(args: &EncodeArgs) -> OokResult<()> {
    let data = fs::read(&args.input)?;
    let bits = if args.framed {
        let frame = Frame::new(args.header()).with_chunk(Chunk::bytes(args.chunk.into(), &data));
        let bitstring = frame.to_symbols(!args.no_prefix)?.to_bitstring();
        fs::write(&args.output, &bitstring)?;
        bitstring.len()
    } else {
        write_bitstring_file(&data, &args.output)?
    };
    println!("Wrote {bits} bits to {}", args.output.display());
    Ok(())
}

fn decode_command(args: &DecodeArgs) -> OokResult<()> {
    let symbols = load_symbols_from_path(&args.input)?;
    let bytes = if args.framed {
        let frame = Frame::parse(&symbols, !args.no_prefix)?;
        log::info!("Frame header: {:?}", frame.header);
        let Some(first) = frame.chunks.first() else {
            return Err(OokError::Config("frame carries no data chunk".into()));
        };
        if frame.chunks.len() > 1 {
            log::warn!(
                "Frame carries {} data chunks, writing only the first",
                frame.chunks.len()
            );
        }
        first.to_bytes()?
    } else {
        symbols_to_bytes(&symbols)
    };
    fs::write(&args.output, &bytes)?;
    println!("Wrote {} bytes to {}", bytes.len(), args.output.display());
    Ok(())
}

fn profile_command(action: ProfileAction) -> OokResult<()> {
    match action {
        ProfileAction::Save {
            name,
            profile_dir,
            rf,
            timing,
        } => {
            let mut config = Configuration {
                name,
                ..Configuration::default()
            };
            rf.apply(&mut config.tx);
            timing.apply(&mut config.timing);
            let path = profiles::save_configuration(&profile_dir, &config)?;
            println!("Saved {}", path.display());
        }
        ProfileAction::Show { name, profile_dir } => {
            let config = profiles::load_configuration(&profile_dir, &name)?;
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| OokError::Config(format!("Serialization error: {e}")))?;
            println!("{json}");
        }
        ProfileAction::List { profile_dir } => {
            for name in profiles::list_configurations(&profile_dir)? {
                println!("{name}");
            }
        }
        ProfileAction::Delete { name, profile_dir } => {
            profiles::delete_configuration(&profile_dir, &name)?;
            println!("Deleted {name}");
        }
    }
    Ok(())
}
