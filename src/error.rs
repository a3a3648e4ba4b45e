//! Error types shared by the compressor and the decompressor.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a compression or decompression run.
///
/// No variant is recoverable: the operation stops and whatever was already
/// written to the output must be treated as invalid.
#[derive(Error, Debug)]
pub enum Error {
    /// The input could not be opened, read or repositioned.
    #[error("input unavailable: {0}")]
    InputUnavailable(#[source] io::Error),

    /// The output could not be created or written.
    #[error("output unwritable: {0}")]
    OutputUnwritable(#[source] io::Error),

    /// The code table at the start of a compressed stream is damaged.
    #[error("malformed code table: {0}")]
    MalformedTable(#[from] TableError),

    /// The table parsed, but the payload that follows does not decode.
    #[error("corrupt payload: {0}")]
    CorruptPayload(#[from] PayloadError),

    /// The input produced different bytes on the encoding pass than on the
    /// counting pass.
    #[error("input changed between the counting and encoding passes")]
    InputChanged,

    /// Input and output name the same file, so opening the output would
    /// truncate the input before it is read.
    #[error("input and output are the same file: {}", .0.display())]
    SameFile(PathBuf),
}

/// Ways a serialized code table can be malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The stream ended before the end-of-table marker.
    #[error("stream ended before the end-of-table marker")]
    Truncated,

    /// A path position held something other than a bit or a framing marker.
    #[error("invalid path byte {value:#04x} at offset {offset}")]
    InvalidPathByte {
        /// Offset of the offending byte from the start of the stream.
        offset: u64,
        /// The byte found there.
        value: u8,
    },

    /// A row carried no path bits at all.
    #[error("empty code for byte {symbol:#04x}")]
    EmptyCode {
        /// Byte value of the row.
        symbol: u8,
    },

    /// A row's path is longer than any Huffman tree over bytes can be deep.
    #[error("code for byte {symbol:#04x} is longer than 255 bits")]
    CodeTooLong {
        /// Byte value of the row.
        symbol: u8,
    },

    /// The same byte value was given two codes.
    #[error("byte {symbol:#04x} appears in more than one row")]
    DuplicateSymbol {
        /// The repeated byte value.
        symbol: u8,
    },

    /// A code is a prefix of another code, or two codes are identical.
    #[error("code for byte {symbol:#04x} collides with another code")]
    PrefixConflict {
        /// Byte value of the row that could not be placed.
        symbol: u8,
    },

    /// The rows describe more internal nodes than 256 leaves can need.
    #[error("table describes more than 255 internal nodes")]
    TooManyNodes,
}

/// Ways the payload after a valid table can fail to decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The stream ended inside the payload length field.
    #[error("payload length field is missing or truncated")]
    MissingLength,

    /// Fewer bits are present than the length field declares.
    #[error("expected {expected} payload bits, found {available}")]
    Truncated {
        /// Bits declared by the length field.
        expected: u64,
        /// Bits actually present.
        available: u64,
    },

    /// A bit sequence leads to a branch the table never defined.
    #[error("bit sequence at payload bit {position} matches no code")]
    UnassignedCode {
        /// Index of the bit that left the tree.
        position: u64,
    },

    /// The declared bits ran out in the middle of a code.
    #[error("payload ends in the middle of a code")]
    IncompleteSymbol,

    /// Whole bytes follow the declared payload.
    #[error("unexpected bytes after the payload")]
    TrailingBytes,
}
