//! The Huffman tree, built either from byte counts or from serialized code paths.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use bit_vec::BitVec;

use crate::error::TableError;
use crate::frequency::{FrequencyTable, MAX_SYMBOLS};

/// Longest code a tree over 256 leaves can produce.
pub const MAX_CODE_LEN: usize = MAX_SYMBOLS - 1;

const MAX_INTERNAL_NODES: usize = MAX_SYMBOLS - 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Node {
    weight: u64,
    left: Option<usize>,
    right: Option<usize>,
}

/// A Huffman tree stored in an index arena.
///
/// Slots `0..256` are the leaves, the slot index being the byte value. Internal
/// nodes are appended after them, so any index below [`MAX_SYMBOLS`] is a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

impl HuffmanTree {
    /// Builds the tree from the provided frequency table.
    ///
    /// Returns `None` when the table is empty. With a single distinct byte the
    /// root is that byte's leaf.
    ///
    /// Nodes are taken smallest `(weight, slot)` first: on equal weights the
    /// lower byte value wins, leaves win over internal nodes, and internal nodes
    /// go in creation order. The second node of each pair becomes the left child.
    pub fn build(table: &FrequencyTable) -> Option<Self> {
        let mut nodes = vec![Node::default(); MAX_SYMBOLS];
        let mut queue = BinaryHeap::with_capacity(MAX_SYMBOLS);
        for (symbol, count) in table.iter() {
            nodes[symbol as usize].weight = count;
            queue.push(Reverse((count, symbol as usize)));
        }

        loop {
            let Reverse((right_weight, right)) = queue.pop()?;
            let Some(Reverse((left_weight, left))) = queue.pop() else {
                return Some(Self { nodes, root: right });
            };

            let parent = nodes.len();
            let weight = left_weight + right_weight;
            nodes.push(Node {
                weight,
                left: Some(left),
                right: Some(right),
            });
            queue.push(Reverse((weight, parent)));
        }
    }

    /// A tree holding only an internal root, ready for [`Self::insert_path`].
    pub(crate) fn with_empty_root() -> Self {
        Self {
            nodes: vec![Node::default(); MAX_SYMBOLS + 1],
            root: MAX_SYMBOLS,
        }
    }

    /// Walks `path` from the root, creating internal nodes as needed, and hangs
    /// the leaf for `symbol` off the last bit.
    pub(crate) fn insert_path(&mut self, symbol: u8, path: &BitVec) -> Result<(), TableError> {
        if path.is_empty() {
            return Err(TableError::EmptyCode { symbol });
        }
        if path.len() > MAX_CODE_LEN {
            return Err(TableError::CodeTooLong { symbol });
        }

        let last = path.len() - 1;
        let mut index = self.root;
        for (depth, bit) in path.iter().enumerate() {
            let next = self.child(index, bit);
            if depth == last {
                if next.is_some() {
                    return Err(TableError::PrefixConflict { symbol });
                }
                self.set_child(index, bit, symbol as usize);
                break;
            }

            index = match next {
                Some(next) if Self::is_leaf(next) => {
                    return Err(TableError::PrefixConflict { symbol })
                }
                Some(next) => next,
                None => {
                    if self.nodes.len() - MAX_SYMBOLS >= MAX_INTERNAL_NODES {
                        return Err(TableError::TooManyNodes);
                    }
                    let created = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.set_child(index, bit, created);
                    created
                }
            };
        }

        Ok(())
    }

    fn set_child(&mut self, index: usize, bit: bool, child: usize) {
        let node = &mut self.nodes[index];
        if bit {
            node.right = Some(child);
        } else {
            node.left = Some(child);
        }
    }

    /// Index of the root node.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Whether `index` names a leaf slot.
    pub fn is_leaf(index: usize) -> bool {
        index < MAX_SYMBOLS
    }

    /// Byte value held by `index`, if it is a leaf.
    pub fn symbol(&self, index: usize) -> Option<u8> {
        Self::is_leaf(index).then_some(index as u8)
    }

    /// Child of `index` reached by `bit` (`false` = left, `true` = right).
    pub fn child(&self, index: usize, bit: bool) -> Option<usize> {
        let node = self.nodes.get(index)?;
        if bit {
            node.right
        } else {
            node.left
        }
    }

    /// Weight of the root: the number of bytes the tree was built from.
    ///
    /// Trees rebuilt from a serialized table carry no weights and report zero.
    pub fn weight(&self) -> u64 {
        self.nodes[self.root].weight
    }

    /// Number of internal nodes.
    pub fn internal_nodes(&self) -> usize {
        self.nodes.len() - MAX_SYMBOLS
    }

    /// Every leaf with its path from the root, depth first, left before right.
    ///
    /// A lone leaf at the root gets the synthetic path `0`.
    pub fn leaf_paths(&self) -> Vec<(u8, BitVec)> {
        if Self::is_leaf(self.root) {
            return vec![(self.root as u8, BitVec::from_elem(1, false))];
        }

        let mut paths = Vec::new();
        let mut stack = vec![(self.root, BitVec::new())];
        while let Some((index, path)) = stack.pop() {
            if Self::is_leaf(index) {
                paths.push((index as u8, path));
                continue;
            }

            let node = self.nodes[index];
            if let Some(right) = node.right {
                let mut right_path = path.clone();
                right_path.push(true);
                stack.push((right, right_path));
            }
            if let Some(left) = node.left {
                let mut left_path = path;
                left_path.push(false);
                stack.push((left, left_path));
            }
        }

        paths
    }
}
