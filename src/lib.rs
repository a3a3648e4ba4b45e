//!
//! Static Huffman compression and decompression implemented in rust.
//!
//! The input is scanned once to count byte frequencies, a Huffman tree is built
//! from the counts, and the resulting code table is written at the front of the
//! output followed by the encoded payload. Decompression rebuilds the tree from
//! that table alone.
//!
//! ## Example
//!
//! ```rust
//! let payload = b"hello from the other side of the river";
//!
//! let compressed = huffpack::compress_to_vec(payload)?;
//! let decompressed = huffpack::decompress_to_vec(&compressed)?;
//!
//! assert_eq!(&payload[..], decompressed);
//! # Ok::<(), huffpack::Error>(())
//! ```
//!
//! ## Format
//!
//! | Section        | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | Table          | rows of `[byte][path bits as 0/1 bytes][2]`, last row ends `255` |
//! | Payload length | number of payload bits, `u64` big endian                        |
//! | Payload        | codes packed most significant bit first, last byte zero padded |
//!
//! An empty input compresses to an empty output.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

// Created with help from:
// - https://en.wikipedia.org/wiki/Huffman_coding

pub mod bits;
pub mod code;
pub mod codec;
pub mod error;
pub mod frequency;
pub mod table;
pub mod tree;

pub use code::CodeTable;
pub use codec::{
    compress, compress_file, compress_to_vec, decompress, decompress_file, decompress_to_vec,
    CompressionStats,
};
pub use error::{Error, PayloadError, Result, TableError};
pub use frequency::{FrequencyTable, MAX_SYMBOLS};
pub use tree::HuffmanTree;
