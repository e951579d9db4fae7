//! Run-length encoder: symbols to alternating on/off runs
//!
//! A run is a maximal block of identical symbols. The encoder makes a single
//! left-to-right pass, so runs partition the sequence exactly and no two
//! adjacent runs share a value. The transmission driver relies on the second
//! property when it flips the keyed value after every run.

use crate::domain::{Symbol, SymbolSequence};

/// A maximal block of `len` identical symbols (`len >= 1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    value: Symbol,
    len: usize,
}

impl Run {
    pub(crate) fn new(value: Symbol, len: usize) -> Self {
        debug_assert!(len >= 1, "runs are never empty");
        Self { value, len }
    }

    pub fn value(&self) -> Symbol {
        self.value
    }

    pub fn length(&self) -> usize {
        self.len
    }
}

/// Ordered runs for one transmission request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunList(Vec<Run>);

impl RunList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Run] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Run> {
        self.0.iter()
    }

    /// Sum of run lengths; equals the encoded sequence length
    pub fn total_symbols(&self) -> usize {
        self.0.iter().map(Run::length).sum()
    }

    /// Expand back into the symbol sequence (each value repeated `len` times)
    pub fn expand(&self) -> SymbolSequence {
        let mut symbols = SymbolSequence::with_capacity(self.total_symbols());
        for run in &self.0 {
            for _ in 0..run.len {
                symbols.push(run.value);
            }
        }
        symbols
    }

    /// `(value, len)` pairs, convenient for display and assertions
    pub fn pairs(&self) -> Vec<(Symbol, usize)> {
        self.0.iter().map(|r| (r.value, r.len)).collect()
    }
}

impl<'a> IntoIterator for &'a RunList {
    type Item = &'a Run;
    type IntoIter = std::slice::Iter<'a, Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Encode `symbols` into runs. An empty sequence gives an empty list.
pub fn encode_runs(symbols: &SymbolSequence) -> RunList {
    let mut runs = Vec::new();
    let mut iter = symbols.iter();

    let Some(mut current) = iter.next() else {
        return RunList(runs);
    };
    let mut count = 1usize;

    for symbol in iter {
        if symbol == current {
            count += 1;
        } else {
            runs.push(Run::new(current, count));
            current = symbol;
            count = 1;
        }
    }
    // Last run
    runs.push(Run::new(current, count));

    RunList(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ook::loader::parse_symbols;
    use Symbol::{Off, On};

    #[test]
    fn encodes_two_blocks() {
        let runs = encode_runs(&parse_symbols("111000"));
        assert_eq!(runs.pairs(), vec![(On, 3), (Off, 3)]);
    }

    #[test]
    fn alternating_symbols_are_single_runs() {
        let runs = encode_runs(&parse_symbols("101"));
        assert_eq!(runs.pairs(), vec![(On, 1), (Off, 1), (On, 1)]);
    }

    #[test]
    fn empty_sequence_gives_no_runs() {
        let runs = encode_runs(&SymbolSequence::new());
        assert!(runs.is_empty());
        assert_eq!(runs.total_symbols(), 0);
    }

    #[test]
    fn single_symbol_and_uniform_sequences() {
        assert_eq!(encode_runs(&parse_symbols("0")).pairs(), vec![(Off, 1)]);
        assert_eq!(
            encode_runs(&parse_symbols("11111111")).pairs(),
            vec![(On, 8)]
        );
    }

    #[test]
    fn runs_partition_and_alternate() {
        let inputs = [
            "0",
            "01",
            "0011100101",
            "1111011110000001",
            "10101010101010101",
            "000000000000000000001",
        ];
        for text in inputs {
            let symbols = parse_symbols(text);
            let runs = encode_runs(&symbols);

            assert_eq!(runs.expand(), symbols, "round trip failed for {text}");
            assert_eq!(runs.total_symbols(), symbols.len());
            assert_eq!(runs.as_slice()[0].value(), symbols.first().unwrap());
            for pair in runs.as_slice().windows(2) {
                assert_ne!(pair[0].value(), pair[1].value(), "adjacent runs equal in {text}");
            }
            assert!(runs.iter().all(|r| r.length() >= 1));
        }
    }
}
