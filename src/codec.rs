//! Compression and decompression pipelines.
//!
//! A compressed stream is the code table (see [`crate::table`]), an 8-byte
//! big-endian count of payload bits, then the payload packed most significant
//! bit first. The count tells the decoder where the real bits stop and the
//! zero padding of the last byte begins. An empty input compresses to an
//! empty stream.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, ErrorKind, Read, Seek, Write};
use std::path::Path;

use log::{debug, info};

use crate::bits::{BitPacker, BitUnpacker};
use crate::code::CodeTable;
use crate::error::{Error, PayloadError, Result};
use crate::frequency::FrequencyTable;
use crate::table::{read_table, write_table};
use crate::tree::HuffmanTree;

/// Size of the payload bit count stored after the table.
pub const PAYLOAD_LEN_BYTES: u64 = 8;

/// What a compression run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Bytes read from the input.
    pub input_bytes: u64,
    /// Bytes taken by the serialized code table.
    pub table_bytes: u64,
    /// Meaningful bits in the payload, padding excluded.
    pub payload_bits: u64,
}

impl CompressionStats {
    /// Total size of the compressed stream.
    pub fn output_bytes(&self) -> u64 {
        if self.input_bytes == 0 {
            return 0;
        }
        self.table_bytes + PAYLOAD_LEN_BYTES + (self.payload_bits + 7) / 8
    }
}

/// Compresses everything in `input` into `output`.
///
/// The input is read twice, once to count bytes and once to encode them, so it
/// must be seekable. It is rewound to the start before each pass.
///
/// ```rust
/// use std::io::Cursor;
///
/// let mut compressed = Vec::new();
/// let stats = huffpack::compress(Cursor::new(b"AAAB"), &mut compressed)?;
///
/// assert_eq!(stats.payload_bits, 4);
/// assert_eq!(compressed.len() as u64, stats.output_bytes());
/// # Ok::<(), huffpack::Error>(())
/// ```
pub fn compress<R: Read + Seek, W: Write>(mut input: R, output: W) -> Result<CompressionStats> {
    input.rewind().map_err(Error::InputUnavailable)?;
    let frequencies =
        FrequencyTable::from_reader(BufReader::new(&mut input)).map_err(Error::InputUnavailable)?;
    input.rewind().map_err(Error::InputUnavailable)?;
    debug!(
        "counted {} bytes, {} distinct",
        frequencies.total(),
        frequencies.distinct()
    );

    let Some(tree) = HuffmanTree::build(&frequencies) else {
        debug!("empty input, nothing to write");
        return Ok(CompressionStats::default());
    };
    debug!("built tree with {} internal nodes", tree.internal_nodes());

    let codes = CodeTable::from_tree(&tree);
    let payload_bits = codes.encoded_len(&frequencies);

    let mut writer = BufWriter::new(output);
    let table_bytes = write_table(&tree, &mut writer).map_err(Error::OutputUnwritable)?;
    writer
        .write_all(&payload_bits.to_be_bytes())
        .map_err(Error::OutputUnwritable)?;
    debug!(
        "wrote {} table bytes, encoding {} payload bits",
        table_bytes, payload_bits
    );

    let mut packer = BitPacker::new(writer);
    let mut reader = BufReader::new(input);
    let mut input_bytes = 0u64;
    loop {
        let chunk = match reader.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::InputUnavailable(e)),
        };
        if chunk.is_empty() {
            break;
        }
        for &byte in chunk {
            let code = codes.get(byte).ok_or(Error::InputChanged)?;
            packer.push_bits(code).map_err(Error::OutputUnwritable)?;
        }
        let consumed = chunk.len();
        input_bytes += consumed as u64;
        reader.consume(consumed);
    }

    if input_bytes != frequencies.total() || packer.bits_written() != payload_bits {
        return Err(Error::InputChanged);
    }

    let mut writer = packer.finish().map_err(Error::OutputUnwritable)?;
    writer.flush().map_err(Error::OutputUnwritable)?;

    let stats = CompressionStats {
        input_bytes,
        table_bytes,
        payload_bits,
    };
    info!(
        "compressed {} bytes into {} ({:.1}%)",
        stats.input_bytes,
        stats.output_bytes(),
        stats.output_bytes() as f64 * 100.0 / stats.input_bytes as f64
    );
    Ok(stats)
}

/// Expands a compressed stream from `input` into `output`.
///
/// Returns the number of bytes written. An empty input yields an empty output.
pub fn decompress<R: Read, W: Write>(input: R, output: W) -> Result<u64> {
    let mut reader = BufReader::new(input);
    if reader.fill_buf().map_err(Error::InputUnavailable)?.is_empty() {
        debug!("empty input, nothing to decode");
        return Ok(0);
    }

    let (tree, table_bytes) = read_table(&mut reader)?;
    debug!(
        "read {} table bytes, {} internal nodes",
        table_bytes,
        tree.internal_nodes()
    );

    let mut len = [0u8; PAYLOAD_LEN_BYTES as usize];
    reader.read_exact(&mut len).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => Error::from(PayloadError::MissingLength),
        _ => Error::InputUnavailable(e),
    })?;
    let payload_bits = u64::from_be_bytes(len);
    debug!("decoding {} payload bits", payload_bits);

    let mut writer = BufWriter::new(output);
    let mut bits = BitUnpacker::new(&mut reader);
    let mut node = tree.root();
    let mut written = 0u64;
    for position in 0..payload_bits {
        let bit = match bits.next() {
            Some(bit) => bit.map_err(Error::InputUnavailable)?,
            None => {
                return Err(PayloadError::Truncated {
                    expected: payload_bits,
                    available: position,
                }
                .into())
            }
        };

        node = tree
            .child(node, bit)
            .ok_or(PayloadError::UnassignedCode { position })?;
        if let Some(symbol) = tree.symbol(node) {
            writer.write_all(&[symbol]).map_err(Error::OutputUnwritable)?;
            written += 1;
            node = tree.root();
        }
    }

    if node != tree.root() {
        return Err(PayloadError::IncompleteSymbol.into());
    }
    match bits.into_inner().next() {
        Some(Ok(_)) => return Err(PayloadError::TrailingBytes.into()),
        Some(Err(e)) => return Err(Error::InputUnavailable(e)),
        None => {}
    }

    writer.flush().map_err(Error::OutputUnwritable)?;
    info!("decompressed {} bytes", written);
    Ok(written)
}

/// Fails with [`Error::SameFile`] when `output` already exists and resolves to
/// the same file as `input`.
fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    let input = input.canonicalize().map_err(Error::InputUnavailable)?;
    match output.canonicalize() {
        Ok(output) if output == input => Err(Error::SameFile(output)),
        _ => Ok(()),
    }
}

/// Compresses the file at `input` into a new file at `output`.
///
/// An existing `output` is truncated, unless it is `input` itself.
pub fn compress_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<CompressionStats> {
    ensure_distinct(input.as_ref(), output.as_ref())?;
    let input = File::open(input).map_err(Error::InputUnavailable)?;
    let output = File::create(output).map_err(Error::OutputUnwritable)?;
    compress(input, output)
}

/// Decompresses the file at `input` into a new file at `output`.
///
/// An existing `output` is truncated, unless it is `input` itself.
pub fn decompress_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<u64> {
    ensure_distinct(input.as_ref(), output.as_ref())?;
    let input = File::open(input).map_err(Error::InputUnavailable)?;
    let output = File::create(output).map_err(Error::OutputUnwritable)?;
    decompress(input, output)
}

/// Compresses `data` into a new buffer.
pub fn compress_to_vec(data: &[u8]) -> Result<Vec<u8>> {
    let mut compressed = Vec::new();
    compress(Cursor::new(data), &mut compressed)?;
    Ok(compressed)
}

/// Decompresses `data` into a new buffer.
pub fn decompress_to_vec(data: &[u8]) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    decompress(data, &mut decompressed)?;
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{END_OF_TABLE, ROW_DELIMITER};
    use proptest::prelude::*;
    use std::io::{self, SeekFrom};
    use std::path::PathBuf;

    const LOREM: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est laborum.";

    fn round_trip(payload: &[u8]) -> Vec<u8> {
        let compressed = compress_to_vec(payload).unwrap();
        let decompressed = decompress_to_vec(&compressed).unwrap();
        assert_eq!(payload, &decompressed[..]);
        compressed
    }

    fn payload_error(data: &[u8]) -> PayloadError {
        match decompress_to_vec(data) {
            Err(Error::CorruptPayload(e)) => e,
            other => panic!("expected a payload error, got {:?}", other),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("huffpack-{}-{}", std::process::id(), name))
    }

    /// Serves one byte string until it has been rewound twice, then another.
    struct ShiftingInput {
        before: Cursor<Vec<u8>>,
        after: Cursor<Vec<u8>>,
        rewinds: usize,
    }

    impl ShiftingInput {
        fn current(&mut self) -> &mut Cursor<Vec<u8>> {
            if self.rewinds >= 2 {
                &mut self.after
            } else {
                &mut self.before
            }
        }
    }

    impl Read for ShiftingInput {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.current().read(buf)
        }
    }

    impl Seek for ShiftingInput {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.rewinds += 1;
            self.current().seek(pos)
        }
    }

    #[test]
    fn compress_decompress() {
        round_trip(b"so much words wow many compression");
    }

    #[test]
    fn compress_decompress_lorem_ipsum() {
        let payload = LOREM.repeat(20);
        let compressed = round_trip(&payload);

        assert!(compressed.len() < payload.len());
    }

    #[test]
    fn scenario_bytes() {
        let compressed = round_trip(&[0x41, 0x41, 0x41, 0x42]);

        assert_eq!(
            compressed,
            vec![
                0x41, 0, ROW_DELIMITER, 0x42, 1, END_OF_TABLE,
                0, 0, 0, 0, 0, 0, 0, 4,
                0b0001_0000,
            ]
        );
    }

    #[test]
    fn payload_size_0() {
        let compressed = round_trip(&[]);

        assert!(compressed.is_empty());
    }

    #[test]
    fn payload_size_1() {
        let compressed = round_trip(&[0u8]);

        assert_eq!(compressed, vec![0, 0, END_OF_TABLE, 0, 0, 0, 0, 0, 0, 0, 1, 0]);
    }

    #[test]
    fn single_symbol_input() {
        let payload = [0x41u8; 1000];
        let compressed = round_trip(&payload);

        assert_eq!(compressed.len(), 3 + 8 + 125);
        assert!(compressed[11..].iter().all(|&b| b == 0));
    }

    #[test]
    fn every_byte_value() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

        round_trip(&payload);
    }

    #[test]
    fn stats_match_output() {
        let mut compressed = Vec::new();
        let stats = compress(Cursor::new(LOREM), &mut compressed).unwrap();

        assert_eq!(stats.input_bytes, LOREM.len() as u64);
        assert_eq!(stats.output_bytes(), compressed.len() as u64);

        let mut decompressed = Vec::new();
        let written = decompress(&compressed[..], &mut decompressed).unwrap();
        assert_eq!(written, LOREM.len() as u64);
    }

    #[test]
    fn compress_rewinds_input() {
        let mut input = Cursor::new(b"AAAB".to_vec());
        input.set_position(3);

        let mut compressed = Vec::new();
        let stats = compress(&mut input, &mut compressed).unwrap();
        assert_eq!(stats.input_bytes, 4);
    }

    #[test]
    fn changed_input_is_detected() {
        let input = ShiftingInput {
            before: Cursor::new(b"AAAB".to_vec()),
            after: Cursor::new(b"AAAC".to_vec()),
            rewinds: 0,
        };

        let result = compress(input, Vec::new());
        assert!(matches!(result, Err(Error::InputChanged)));
    }

    #[test]
    fn grown_input_is_detected() {
        let input = ShiftingInput {
            before: Cursor::new(b"AAAB".to_vec()),
            after: Cursor::new(b"AAABA".to_vec()),
            rewinds: 0,
        };

        let result = compress(input, Vec::new());
        assert!(matches!(result, Err(Error::InputChanged)));
    }

    #[test]
    fn missing_length() {
        assert_eq!(
            payload_error(&[0x41, 0, END_OF_TABLE, 0, 0, 0]),
            PayloadError::MissingLength
        );
    }

    #[test]
    fn truncated_payload() {
        let mut compressed = compress_to_vec(LOREM).unwrap();
        compressed.pop();

        assert!(matches!(
            payload_error(&compressed),
            PayloadError::Truncated { .. }
        ));
    }

    #[test]
    fn trailing_bytes() {
        let mut compressed = compress_to_vec(LOREM).unwrap();
        compressed.push(0);

        assert_eq!(payload_error(&compressed), PayloadError::TrailingBytes);
    }

    #[test]
    fn padding_is_not_decoded() {
        // 0x41 has code "0", so the seven padding zeros would decode as 0x41.
        let data = [0x41, 0, ROW_DELIMITER, 0x42, 1, END_OF_TABLE, 0, 0, 0, 0, 0, 0, 0, 1, 0x80];

        assert_eq!(decompress_to_vec(&data).unwrap(), vec![0x42]);
    }

    #[test]
    fn unassigned_code() {
        let data = [0x41, 0, END_OF_TABLE, 0, 0, 0, 0, 0, 0, 0, 2, 0b0100_0000];

        assert_eq!(
            payload_error(&data),
            PayloadError::UnassignedCode { position: 1 }
        );
    }

    #[test]
    fn incomplete_symbol() {
        let data = [
            0x41, 0, 0, ROW_DELIMITER, 0x42, 0, 1, ROW_DELIMITER, 0x43, 1, END_OF_TABLE,
            0, 0, 0, 0, 0, 0, 0, 2,
            0b1000_0000,
        ];

        assert_eq!(payload_error(&data), PayloadError::IncompleteSymbol);
    }

    #[test]
    fn malformed_table_is_reported() {
        let result = decompress_to_vec(&[0x41, 0, ROW_DELIMITER]);

        assert!(matches!(result, Err(Error::MalformedTable(_))));
    }

    #[test]
    fn file_round_trip() {
        let original = temp_path("file_round_trip.txt");
        let compressed = temp_path("file_round_trip.huff");
        let restored = temp_path("file_round_trip.out");
        std::fs::write(&original, LOREM).unwrap();

        let stats = compress_file(&original, &compressed).unwrap();
        assert_eq!(
            std::fs::metadata(&compressed).unwrap().len(),
            stats.output_bytes()
        );
        decompress_file(&compressed, &restored).unwrap();
        assert_eq!(std::fs::read(&restored).unwrap(), LOREM);

        for path in [original, compressed, restored] {
            std::fs::remove_file(path).unwrap();
        }
    }

    #[test]
    fn missing_input_file() {
        let result = compress_file(temp_path("does-not-exist"), temp_path("never-written"));

        assert!(matches!(result, Err(Error::InputUnavailable(_))));
    }

    #[test]
    fn same_file_is_refused() {
        let path = temp_path("same_file.txt");
        std::fs::write(&path, LOREM).unwrap();

        let result = compress_file(&path, &path);
        assert!(matches!(result, Err(Error::SameFile(_))));
        let result = decompress_file(&path, &path);
        assert!(matches!(result, Err(Error::SameFile(_))));
        assert_eq!(std::fs::read(&path).unwrap(), LOREM);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn same_file_through_another_spelling() {
        let path = temp_path("same_file_spelling.txt");
        std::fs::write(&path, LOREM).unwrap();
        let dir = path.parent().unwrap();
        let other = dir.join(".").join(path.file_name().unwrap());

        let result = compress_file(&path, &other);
        assert!(matches!(result, Err(Error::SameFile(_))));
        assert_eq!(std::fs::read(&path).unwrap(), LOREM);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn unwritable_output_file() {
        let original = temp_path("unwritable_output.txt");
        std::fs::write(&original, LOREM).unwrap();

        let output = temp_path("no-such-dir").join("out.huff");
        let result = compress_file(&original, output);
        assert!(matches!(result, Err(Error::OutputUnwritable(_))));

        std::fs::remove_file(original).unwrap();
    }

    proptest! {
        #[test]
        fn proptest_compress_decompress(data: Vec<u8>) {
            let compressed = compress_to_vec(&data).unwrap();
            let decompressed = decompress_to_vec(&compressed).unwrap();

            prop_assert_eq!(data, decompressed);
        }

        #[test]
        fn proptest_garbage_does_not_panic(data: Vec<u8>) {
            let _ = decompress_to_vec(&data);
        }
    }
}
