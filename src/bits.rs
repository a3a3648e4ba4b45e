//! Packing single bits into bytes and back, most significant bit first.

use std::io::{self, Bytes, Read, Write};

use bit_vec::BitVec;

/// Up to seven bits waiting to become a whole byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bits: u8,
    len: u8,
}

impl BitBuffer {
    /// Appends a bit, returning the completed byte once eight are collected.
    pub fn push(&mut self, bit: bool) -> Option<u8> {
        self.bits = (self.bits << 1) | bit as u8;
        self.len += 1;
        if self.len == 8 {
            let byte = self.bits;
            *self = Self::default();
            Some(byte)
        } else {
            None
        }
    }

    /// Pads any pending bits with zeros and returns them as a byte.
    pub fn take_padded(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let byte = self.bits << (8 - self.len);
        *self = Self::default();
        Some(byte)
    }

    /// Number of pending bits.
    pub fn len(&self) -> u8 {
        self.len
    }

    /// Whether no bits are pending.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Writes a bit stream to `W`.
#[derive(Debug)]
pub struct BitPacker<W: Write> {
    inner: W,
    buffer: BitBuffer,
    bits_written: u64,
}

impl<W: Write> BitPacker<W> {
    /// Wraps `inner`. Writes happen one byte at a time, so a buffered writer
    /// is advisable.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: BitBuffer::default(),
            bits_written: 0,
        }
    }

    /// Appends a single bit.
    pub fn push_bit(&mut self, bit: bool) -> io::Result<()> {
        self.bits_written += 1;
        match self.buffer.push(bit) {
            Some(byte) => self.inner.write_all(&[byte]),
            None => Ok(()),
        }
    }

    /// Appends every bit of `bits` in order.
    pub fn push_bits(&mut self, bits: &BitVec) -> io::Result<()> {
        for bit in bits.iter() {
            self.push_bit(bit)?;
        }
        Ok(())
    }

    /// Bits pushed so far, padding excluded.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Writes the zero-padded tail, if any, and hands back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(byte) = self.buffer.take_padded() {
            self.inner.write_all(&[byte])?;
        }
        Ok(self.inner)
    }
}

/// Reads a byte stream as a lazy sequence of bits.
#[derive(Debug)]
pub struct BitUnpacker<R: Read> {
    bytes: Bytes<R>,
    current: u8,
    remaining: u8,
}

impl<R: Read> BitUnpacker<R> {
    /// Wraps `inner`. Reads happen one byte at a time, so a buffered reader
    /// is advisable.
    pub fn new(inner: R) -> Self {
        Self {
            bytes: inner.bytes(),
            current: 0,
            remaining: 0,
        }
    }

    /// Hands back the reader, dropping any bits left in the current byte.
    pub fn into_inner(self) -> Bytes<R> {
        self.bytes
    }
}

impl<R: Read> Iterator for BitUnpacker<R> {
    type Item = io::Result<bool>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            match self.bytes.next()? {
                Ok(byte) => {
                    self.current = byte;
                    self.remaining = 8;
                }
                Err(e) => return Some(Err(e)),
            }
        }
        self.remaining -= 1;
        Some(Ok((self.current >> self.remaining) & 1 == 1))
    }
}
