//! Framed payloads
//!
//! A frame is a sequence of chunks, each `type (8 bits) | length (32 bits) |
//! payload (length bits)`, all MSB first. The first seven chunks carry the
//! transfer header (version, direction, transmission mode, CRC flag, transfer
//! id, spacecraft id, ground station id). Data chunks follow.
//!
//! With the cyclic prefix enabled the frame starts with a fixed 212-symbol
//! training pattern and ends with 30 `On` symbols.

use serde::{Deserialize, Serialize};

use crate::domain::{OokError, OokResult, Symbol, SymbolSequence};

use super::bits::symbols_to_bytes;

pub const TYPE_BITS: usize = 8;
pub const LENGTH_BITS: usize = 32;
pub const PREFIX_TAIL_LEN: usize = 30;

/// Run lengths of the prefix head, starting with an `On` run
const PREFIX_HEAD_RUNS: [usize; 21] = [1, 1, 1, 1, 1, 2, 1, 3, 1, 4, 1, 5, 2, 10, 2, 20, 2, 50, 2, 100, 2];

/// Type tag of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChunkKind {
    Int = 0,
    Float = 1,
    Text = 2,
    Image = 3,
    Bool = 4,
    Telemetry = 5,
    Csv = 6,
    TextFile = 7,
    Json = 8,
}

impl ChunkKind {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        use ChunkKind::*;
        [Int, Float, Text, Image, Bool, Telemetry, Csv, TextFile, Json]
            .into_iter()
            .find(|kind| kind.id() == id)
    }
}

/// One `type | length | payload` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub type_id: u8,
    pub bits: SymbolSequence,
}

impl Chunk {
    pub fn new(kind: ChunkKind, bits: SymbolSequence) -> Self {
        Self {
            type_id: kind.id(),
            bits,
        }
    }

    /// Unsigned integer in its shortest binary form (`0` is a single bit)
    pub fn uint(value: u64) -> Self {
        let width = (u64::BITS - value.leading_zeros()).max(1) as usize;
        let bits = (0..width)
            .rev()
            .map(|shift| Symbol::from_bit((value >> shift) & 1 == 1))
            .collect();
        Self::new(ChunkKind::Int, bits)
    }

    pub fn flag(value: bool) -> Self {
        Self::new(ChunkKind::Bool, [Symbol::from_bit(value)].into_iter().collect())
    }

    /// Byte payload (file contents, text, telemetry dump), MSB first
    pub fn bytes(kind: ChunkKind, data: &[u8]) -> Self {
        Self::new(kind, SymbolSequence::from_bytes(data))
    }

    pub fn kind(&self) -> Option<ChunkKind> {
        ChunkKind::from_id(self.type_id)
    }

    pub fn as_uint(&self) -> OokResult<u64> {
        if self.bits.is_empty() || self.bits.len() > u64::BITS as usize {
            return Err(OokError::Config(format!(
                "{}-bit chunk does not hold an unsigned integer",
                self.bits.len()
            )));
        }
        Ok(read_uint(self.bits.as_slice()))
    }

    pub fn as_flag(&self) -> OokResult<bool> {
        match self.bits.as_slice() {
            [symbol] => Ok(symbol.is_on()),
            other => Err(OokError::Config(format!(
                "flag chunk must be 1 bit, got {}",
                other.len()
            ))),
        }
    }

    /// Payload packed back into bytes; the length must be whole bytes.
    pub fn to_bytes(&self) -> OokResult<Vec<u8>> {
        if self.bits.len() % 8 != 0 {
            return Err(OokError::Config(format!(
                "{}-bit chunk is not a whole number of bytes",
                self.bits.len()
            )));
        }
        Ok(symbols_to_bytes(&self.bits))
    }

    fn encode_into(&self, out: &mut SymbolSequence) -> OokResult<()> {
        let length = u32::try_from(self.bits.len()).map_err(|_| {
            OokError::Config(format!(
                "chunk of {} bits exceeds the 32-bit length field",
                self.bits.len()
            ))
        })?;
        push_uint(out, u64::from(self.type_id), TYPE_BITS);
        push_uint(out, u64::from(length), LENGTH_BITS);
        for symbol in self.bits.iter() {
            out.push(symbol);
        }
        Ok(())
    }
}

fn push_uint(out: &mut SymbolSequence, value: u64, width: usize) {
    for shift in (0..width).rev() {
        out.push(Symbol::from_bit((value >> shift) & 1 == 1));
    }
}

fn read_uint(bits: &[Symbol]) -> u64 {
    bits.iter()
        .fold(0, |acc, symbol| (acc << 1) | u64::from(symbol.is_on()))
}

/// Concatenate `chunks` into one bitstream
pub fn encode_chunks(chunks: &[Chunk]) -> OokResult<SymbolSequence> {
    let mut out = SymbolSequence::new();
    for chunk in chunks {
        chunk.encode_into(&mut out)?;
    }
    Ok(out)
}

/// Split a bitstream into chunks. A header or payload cut short is an error.
pub fn decode_chunks(symbols: &[Symbol]) -> OokResult<Vec<Chunk>> {
    let mut chunks = Vec::new();
    let mut pos = 0;
    while pos < symbols.len() {
        let header_end = pos + TYPE_BITS + LENGTH_BITS;
        if header_end > symbols.len() {
            return Err(OokError::Config(format!(
                "truncated chunk header at bit {pos}"
            )));
        }
        let type_id = read_uint(&symbols[pos..pos + TYPE_BITS]) as u8;
        let length = read_uint(&symbols[pos + TYPE_BITS..header_end]) as usize;
        let end = header_end + length;
        if end > symbols.len() {
            return Err(OokError::Config(format!(
                "chunk at bit {pos} announces {length} bits, only {} left",
                symbols.len() - header_end
            )));
        }
        chunks.push(Chunk {
            type_id,
            bits: symbols[header_end..end].iter().copied().collect(),
        });
        pos = end;
    }
    Ok(chunks)
}

/// Training pattern sent ahead of a framed payload
pub fn prefix_head() -> SymbolSequence {
    let mut head = SymbolSequence::new();
    let mut value = Symbol::On;
    for length in PREFIX_HEAD_RUNS {
        for _ in 0..length {
            head.push(value);
        }
        value = value.flipped();
    }
    head
}

/// Transfer header carried in the first seven chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    pub version: u32,
    /// 0 for spacecraft to ground, 1 for ground to spacecraft
    pub direction: u32,
    /// 1 acknowledged, 0 unacknowledged
    pub transmission_mode: u32,
    pub crc_flag: bool,
    pub transfer_id: u32,
    pub spacecraft_id: u32,
    pub groundstation_id: u32,
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            version: 1,
            direction: 0,
            transmission_mode: 0,
            crc_flag: false,
            transfer_id: 0,
            spacecraft_id: 0,
            groundstation_id: 0,
        }
    }
}

const HEADER_CHUNKS: usize = 7;

impl FrameHeader {
    fn to_chunks(self) -> [Chunk; HEADER_CHUNKS] {
        [
            Chunk::uint(self.version.into()),
            Chunk::uint(self.direction.into()),
            Chunk::uint(self.transmission_mode.into()),
            Chunk::flag(self.crc_flag),
            Chunk::uint(self.transfer_id.into()),
            Chunk::uint(self.spacecraft_id.into()),
            Chunk::uint(self.groundstation_id.into()),
        ]
    }

    fn from_chunks(chunks: &[Chunk]) -> OokResult<Self> {
        let [version, direction, mode, crc, transfer, spacecraft, station] = chunks else {
            return Err(OokError::Config(format!(
                "frame header needs {HEADER_CHUNKS} chunks, got {}",
                chunks.len()
            )));
        };
        let field = |chunk: &Chunk, name: &str| -> OokResult<u32> {
            if chunk.kind() != Some(ChunkKind::Int) {
                return Err(OokError::Config(format!(
                    "header field {name} has type {}, expected an integer",
                    chunk.type_id
                )));
            }
            u32::try_from(chunk.as_uint()?)
                .map_err(|_| OokError::Config(format!("header field {name} exceeds 32 bits")))
        };
        if crc.kind() != Some(ChunkKind::Bool) {
            return Err(OokError::Config(format!(
                "header CRC flag has type {}, expected a boolean",
                crc.type_id
            )));
        }
        Ok(Self {
            version: field(version, "version")?,
            direction: field(direction, "direction")?,
            transmission_mode: field(mode, "transmission mode")?,
            crc_flag: crc.as_flag()?,
            transfer_id: field(transfer, "transfer id")?,
            spacecraft_id: field(spacecraft, "spacecraft id")?,
            groundstation_id: field(station, "ground station id")?,
        })
    }
}

/// Header plus data chunks
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub header: FrameHeader,
    pub chunks: Vec<Chunk>,
}

impl Frame {
    pub fn new(header: FrameHeader) -> Self {
        Self {
            header,
            chunks: Vec::new(),
        }
    }

    pub fn with_chunk(mut self, chunk: Chunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    /// Build the bitstream to key, optionally wrapped in the cyclic prefix
    pub fn to_symbols(&self, cyclic_prefix: bool) -> OokResult<SymbolSequence> {
        let mut out = if cyclic_prefix {
            prefix_head()
        } else {
            SymbolSequence::new()
        };
        for chunk in self.header.to_chunks().iter().chain(&self.chunks) {
            chunk.encode_into(&mut out)?;
        }
        if cyclic_prefix {
            for _ in 0..PREFIX_TAIL_LEN {
                out.push(Symbol::On);
            }
        }
        log::debug!(
            "Framed {} data chunks into {} symbols",
            self.chunks.len(),
            out.len()
        );
        Ok(out)
    }

    pub fn parse(symbols: &SymbolSequence, cyclic_prefix: bool) -> OokResult<Self> {
        let mut body = symbols.as_slice();
        if cyclic_prefix {
            let head = prefix_head();
            body = body.strip_prefix(head.as_slice()).ok_or_else(|| {
                OokError::Config("bitstream does not start with the cyclic prefix".into())
            })?;
            let tail_start = body
                .len()
                .checked_sub(PREFIX_TAIL_LEN)
                .filter(|&start| body[start..].iter().all(|s| s.is_on()))
                .ok_or_else(|| {
                    OokError::Config("bitstream does not end with the cyclic prefix tail".into())
                })?;
            body = &body[..tail_start];
        }

        let mut chunks = decode_chunks(body)?;
        if chunks.len() < HEADER_CHUNKS {
            return Err(OokError::Config(format!(
                "frame holds {} chunks, the header alone needs {HEADER_CHUNKS}",
                chunks.len()
            )));
        }
        let data = chunks.split_off(HEADER_CHUNKS);
        Ok(Self {
            header: FrameHeader::from_chunks(&chunks)?,
            chunks: data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ook::loader::parse_symbols;
    use crate::ook::rle::encode_runs;

    #[test]
    fn chunk_layout_is_type_length_payload() {
        let stream = encode_chunks(&[Chunk::uint(5)]).unwrap();
        // type 0, length 3, payload 101
        let expected = format!("{:08b}{:032b}101", 0, 3);
        assert_eq!(stream.to_bitstring(), expected);
    }

    #[test]
    fn zero_is_encoded_as_one_bit() {
        let chunk = Chunk::uint(0);
        assert_eq!(chunk.bits.to_bitstring(), "0");
        assert_eq!(chunk.as_uint().unwrap(), 0);
    }

    #[test]
    fn prefix_head_matches_its_run_pattern() {
        let head = prefix_head();
        assert_eq!(head.len(), 212);
        assert!(head.to_bitstring().starts_with("1010100100010000100000110"));
        let lengths: Vec<usize> = encode_runs(&head).iter().map(|r| r.length()).collect();
        assert_eq!(lengths, PREFIX_HEAD_RUNS.to_vec());
    }

    #[test]
    fn frame_survives_build_and_parse() {
        let header = FrameHeader {
            transfer_id: 42,
            spacecraft_id: 7,
            groundstation_id: 3,
            crc_flag: true,
            ..FrameHeader::default()
        };
        let frame = Frame::new(header)
            .with_chunk(Chunk::bytes(ChunkKind::TextFile, b"status nominal"))
            .with_chunk(Chunk::bytes(ChunkKind::Json, b"{\"mode\":1}"));

        for cyclic_prefix in [true, false] {
            let symbols = frame.to_symbols(cyclic_prefix).unwrap();
            let parsed = Frame::parse(&symbols, cyclic_prefix).unwrap();
            assert_eq!(parsed, frame);
            assert_eq!(parsed.chunks[0].to_bytes().unwrap(), b"status nominal");
        }
    }

    #[test]
    fn framed_stream_ends_with_tail() {
        let symbols = Frame::default().to_symbols(true).unwrap();
        let bits = symbols.to_bitstring();
        assert!(bits.ends_with(&"1".repeat(PREFIX_TAIL_LEN)));
        assert!(bits.starts_with(&prefix_head().to_bitstring()));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let mut bits = encode_chunks(&[Chunk::bytes(ChunkKind::Telemetry, &[0xAB])])
            .unwrap()
            .to_bitstring();
        bits.truncate(bits.len() - 3);
        let err = decode_chunks(parse_symbols(&bits).as_slice()).unwrap_err();
        assert!(matches!(err, OokError::Config(_)));
    }

    #[test]
    fn missing_prefix_is_rejected() {
        let symbols = Frame::default().to_symbols(false).unwrap();
        assert!(Frame::parse(&symbols, true).is_err());
    }

    #[test]
    fn header_with_wrong_types_is_rejected() {
        let chunks: Vec<Chunk> = (0..HEADER_CHUNKS).map(|_| Chunk::uint(1)).collect();
        let symbols = encode_chunks(&chunks).unwrap();
        // the CRC flag slot holds an integer chunk
        assert!(Frame::parse(&symbols, false).is_err());
    }

    #[test]
    fn chunk_kinds_round_trip_their_ids() {
        for id in 0..=8u8 {
            assert_eq!(ChunkKind::from_id(id).map(ChunkKind::id), Some(id));
        }
        assert_eq!(ChunkKind::from_id(9), None);
    }
}
