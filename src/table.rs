//! The code table stored at the front of every compressed stream.
//!
//! Each leaf becomes one row: the byte value, one byte per path bit (`0` or
//! `1`), then [`ROW_DELIMITER`]. The last row ends with [`END_OF_TABLE`]
//! instead. Rows stand alone, so their order carries no meaning.

use std::io::{self, Bytes, Read, Write};

use bit_vec::BitVec;
use log::trace;

use crate::error::{Error, Result, TableError};
use crate::frequency::MAX_SYMBOLS;
use crate::tree::{HuffmanTree, MAX_CODE_LEN};

/// Ends every row but the last.
pub const ROW_DELIMITER: u8 = 2;

/// Ends the last row, and with it the table.
pub const END_OF_TABLE: u8 = 255;

/// Writes one row per leaf of `tree` and returns the number of bytes written.
pub fn write_table<W: Write>(tree: &HuffmanTree, mut writer: W) -> io::Result<u64> {
    let rows = tree.leaf_paths();
    let mut row = Vec::with_capacity(MAX_CODE_LEN + 2);
    let mut written = 0;

    for (i, (symbol, path)) in rows.iter().enumerate() {
        row.clear();
        row.push(*symbol);
        row.extend(path.iter().map(u8::from));
        row.push(if i + 1 == rows.len() {
            END_OF_TABLE
        } else {
            ROW_DELIMITER
        });

        trace!("table row {:#04x} -> {:?}", symbol, path);
        writer.write_all(&row)?;
        written += row.len() as u64;
    }

    Ok(written)
}

/// Parses rows up to and including the end-of-table marker and rebuilds the tree.
///
/// Returns the tree and the number of bytes consumed. Nothing past the marker
/// is read.
pub fn read_table<R: Read>(reader: R) -> Result<(HuffmanTree, u64)> {
    let mut bytes = reader.bytes();
    let mut offset = 0;
    let mut tree = HuffmanTree::with_empty_root();
    let mut seen = [false; MAX_SYMBOLS];
    let mut path = BitVec::with_capacity(MAX_CODE_LEN);

    loop {
        let symbol = next_byte(&mut bytes, &mut offset)?;
        path.truncate(0);

        let last_row = loop {
            let position = offset;
            match next_byte(&mut bytes, &mut offset)? {
                0 => path.push(false),
                1 => path.push(true),
                ROW_DELIMITER => break false,
                END_OF_TABLE => break true,
                value => {
                    return Err(TableError::InvalidPathByte {
                        offset: position,
                        value,
                    }
                    .into())
                }
            }
            if path.len() > MAX_CODE_LEN {
                return Err(TableError::CodeTooLong { symbol }.into());
            }
        };

        if std::mem::replace(&mut seen[symbol as usize], true) {
            return Err(TableError::DuplicateSymbol { symbol }.into());
        }
        tree.insert_path(symbol, &path)?;
        trace!("table row {:#04x} <- {:?}", symbol, path);

        if last_row {
            return Ok((tree, offset));
        }
    }
}

fn next_byte<R: Read>(bytes: &mut Bytes<R>, offset: &mut u64) -> Result<u8> {
    match bytes.next() {
        Some(Ok(byte)) => {
            *offset += 1;
            Ok(byte)
        }
        Some(Err(e)) => Err(Error::InputUnavailable(e)),
        None => Err(TableError::Truncated.into()),
    }
}
