//! Bit packing: binary data to and from `'0'`/`'1'` bitstring text
//!
//! Bytes are expanded most significant bit first. Packing a bitstring back
//! into bytes pads the last byte with zeros.

use std::fs;
use std::path::Path;

use crate::domain::{OokResult, Symbol, SymbolSequence};

/// `[0xA5]` → `"10100101"`
pub fn bytes_to_bitstring(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 8);
    for byte in data {
        for shift in (0..8).rev() {
            out.push(if (byte >> shift) & 1 == 1 { '1' } else { '0' });
        }
    }
    out
}

/// Pack a bitstring into bytes. Characters other than `'0'`/`'1'` are skipped,
/// a trailing partial byte is padded with zeros.
pub fn bitstring_to_bytes(bits: &str) -> Vec<u8> {
    let symbols: SymbolSequence = bits.bytes().filter_map(Symbol::from_byte).collect();
    symbols_to_bytes(&symbols)
}

/// Pack symbols into bytes, MSB first, zero padded
pub fn symbols_to_bytes(symbols: &SymbolSequence) -> Vec<u8> {
    symbols
        .as_slice()
        .chunks(8)
        .map(|chunk| {
            let mut byte = 0u8;
            for (i, symbol) in chunk.iter().enumerate() {
                if symbol.is_on() {
                    byte |= 0x80 >> i;
                }
            }
            byte
        })
        .collect()
}

impl SymbolSequence {
    /// Every bit of `data`, MSB first
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut symbols = SymbolSequence::with_capacity(data.len() * 8);
        for byte in data {
            for shift in (0..8).rev() {
                symbols.push(Symbol::from_bit((byte >> shift) & 1 == 1));
            }
        }
        symbols
    }
}

/// Read any file as raw symbols (8 per byte)
pub fn load_raw_symbols(path: impl AsRef<Path>) -> OokResult<SymbolSequence> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    log::info!(
        "Loaded {} bytes ({} bits) from {}",
        data.len(),
        data.len() * 8,
        path.display()
    );
    Ok(SymbolSequence::from_bytes(&data))
}

/// Write `data` as a bitstring text file, the format the symbol loader reads
pub fn write_bitstring_file(data: &[u8], path: impl AsRef<Path>) -> OokResult<usize> {
    let bits = bytes_to_bitstring(data);
    fs::write(path, &bits)?;
    Ok(bits.len())
}
