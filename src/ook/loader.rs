//! Symbol loader: bitstream text to symbols
//!
//! Only the ASCII characters `'0'` and `'1'` carry meaning. Every other byte
//! (whitespace, newlines, separators, anything else) is skipped without error,
//! so a bitstream may be wrapped or grouped however the producer likes.
//!
//! The source is streamed through a buffered reader; working storage is one
//! byte per accepted symbol.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::domain::{OokResult, Symbol, SymbolSequence};

/// Read buffer size for streaming large bitstream files
const READ_BUF_SIZE: usize = 64 * 1024;

/// Scan `reader` in order and collect its `'0'`/`'1'` characters.
pub fn load_symbols<R: Read>(reader: R) -> OokResult<SymbolSequence> {
    let mut reader = BufReader::with_capacity(READ_BUF_SIZE, reader);
    let mut symbols = SymbolSequence::new();
    let mut skipped = 0usize;

    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        for &byte in chunk {
            match Symbol::from_byte(byte) {
                Some(symbol) => symbols.push(symbol),
                None => skipped += 1,
            }
        }
        let consumed = chunk.len();
        reader.consume(consumed);
    }

    log::debug!(
        "Loaded {} symbols ({skipped} other bytes ignored)",
        symbols.len()
    );
    Ok(symbols)
}

/// Open `path` and load its symbols. Fails with an I/O error if the file
/// cannot be opened or read; never fails on content.
pub fn load_symbols_from_path(path: impl AsRef<Path>) -> OokResult<SymbolSequence> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let symbols = load_symbols(file)?;
    log::info!("Loaded {} bits from {}", symbols.len(), path.display());
    Ok(symbols)
}

/// Parse an in-memory bitstring with the same lenient rules as [`load_symbols`].
pub fn parse_symbols(text: &str) -> SymbolSequence {
    text.bytes().filter_map(Symbol::from_byte).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn maps_zero_and_one_in_order() {
        let seq = parse_symbols("111000");
        assert_eq!(seq.to_bitstring(), "111000");
        assert_eq!(seq.len(), 6);
    }

    #[test]
    fn skips_whitespace_and_newlines() {
        let seq = parse_symbols("1 0\n1");
        assert_eq!(
            seq.as_slice(),
            &[Symbol::On, Symbol::Off, Symbol::On]
        );
    }

    #[test]
    fn no_bit_characters_yields_empty_sequence() {
        assert!(parse_symbols("2 3 x").is_empty());
        assert!(parse_symbols("").is_empty());
    }

    #[test]
    fn reader_and_str_parsing_agree() {
        let text = "10 11\r\n0001\tabc1";
        let from_reader = load_symbols(Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(from_reader, parse_symbols(text));
        assert_eq!(from_reader.to_bitstring(), "101100011");
    }

    #[test]
    fn non_utf8_bytes_are_ignored() {
        let bytes: &[u8] = &[b'1', 0xFF, 0xFE, b'0', 0x00, b'1'];
        let seq = load_symbols(Cursor::new(bytes)).unwrap();
        assert_eq!(seq.to_bitstring(), "101");
    }

    #[test]
    fn input_spanning_many_buffers() {
        let text = "01 ".repeat(READ_BUF_SIZE);
        let seq = load_symbols(Cursor::new(text.into_bytes())).unwrap();
        assert_eq!(seq.len(), 2 * READ_BUF_SIZE);
        assert_eq!(seq.first(), Some(Symbol::Off));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_symbols_from_path("/definitely/not/here/bitstream.txt");
        assert!(matches!(result, Err(crate::domain::OokError::Io(_))));
    }
}
