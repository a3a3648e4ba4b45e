//! Byte value to bit code lookup, derived from a [`HuffmanTree`].

use bit_vec::BitVec;

use crate::frequency::{FrequencyTable, MAX_SYMBOLS};
use crate::tree::HuffmanTree;

/// Code for every byte value present in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Option<BitVec>; MAX_SYMBOLS],
}

impl CodeTable {
    /// Walks the tree and records the path to every leaf.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = std::array::from_fn(|_| None);
        for (symbol, path) in tree.leaf_paths() {
            codes[symbol as usize] = Some(path);
        }
        Self { codes }
    }

    /// Code for `symbol`, or `None` if the byte never occurred.
    pub fn get(&self, symbol: u8) -> Option<&BitVec> {
        self.codes[symbol as usize].as_ref()
    }

    /// Number of bytes with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    /// Whether no byte has a code.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Codes in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitVec)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|code| (symbol as u8, code)))
    }

    /// Bits needed to encode data with the given counts.
    ///
    /// Bytes that have a count but no code contribute nothing.
    pub fn encoded_len(&self, table: &FrequencyTable) -> u64 {
        table
            .iter()
            .filter_map(|(symbol, count)| self.get(symbol).map(|code| count * code.len() as u64))
            .sum()
    }
}
