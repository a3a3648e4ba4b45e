//! Byte frequency counting.

use std::io::{self, ErrorKind, Read};

/// Max symbols in the frequency table. Covers all possible u8 values.
pub const MAX_SYMBOLS: usize = u8::MAX as usize + 1;

const READ_CHUNK: usize = 8 * 1024;

/// Occurrence count of every byte value in some input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; MAX_SYMBOLS],
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self {
            counts: [0; MAX_SYMBOLS],
        }
    }
}

impl FrequencyTable {
    /// Wraps precomputed counts.
    pub fn new(counts: [u64; MAX_SYMBOLS]) -> Self {
        Self { counts }
    }

    /// Calculates the frequency table from the provided data.
    pub fn from_data(data: &[u8]) -> Self {
        let mut table = Self::default();
        table.update(data);
        table
    }

    /// Calculates the frequency table by reading `reader` until end of stream.
    ///
    /// The reader is left at its end; rewinding it is up to the caller.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut table = Self::default();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) => return Ok(table),
                Ok(n) => table.update(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Adds the bytes of `data` to the counts.
    pub fn update(&mut self, data: &[u8]) {
        for &b in data {
            self.counts[b as usize] += 1;
        }
    }

    /// Count for a single byte value.
    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of distinct byte values seen.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Byte values with a non-zero count, in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn create_freq_table() {
        let table = FrequencyTable::from_data(&[0u8]);

        assert_eq!(table.get(0), 1);
        assert_eq!(table.total(), 1);
        assert_eq!(table.distinct(), 1);
    }

    #[test]
    fn empty_input_counts_nothing() {
        let table = FrequencyTable::from_data(&[]);

        assert_eq!(table, FrequencyTable::default());
        assert_eq!(table.total(), 0);
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn iter_skips_unseen_bytes() {
        let table = FrequencyTable::from_data(b"AAAB");

        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(0x41, 3), (0x42, 1)]);
    }

    #[test]
    fn reader_spanning_several_chunks() {
        let data = vec![7u8; READ_CHUNK * 3 + 5];
        let table = FrequencyTable::from_reader(&data[..]).unwrap();

        assert_eq!(table.get(7), data.len() as u64);
        assert_eq!(table.distinct(), 1);
    }

    proptest! {
        #[test]
        fn proptest_freq_table(data: Vec<u8>) {
            let table = FrequencyTable::from_data(&data);

            for &b in &data {
                prop_assert!(table.get(b) > 0);
            }
            prop_assert_eq!(table.total(), data.len() as u64);
        }

        #[test]
        fn proptest_reader_matches_slice(data: Vec<u8>) {
            let from_reader = FrequencyTable::from_reader(&data[..]).unwrap();
            prop_assert_eq!(from_reader, FrequencyTable::from_data(&data));
        }
    }
}
