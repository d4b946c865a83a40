//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! binary data from a byte slice without copying.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{Error, Result};

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// The reader keeps a position and never reads past the end of the slice;
/// every short read reports how many bytes were needed.
///
/// # Example
///
/// ```
/// use ibx_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u16_be().unwrap(), 0x0102);
/// assert_eq!(reader.read_u16_le().unwrap(), 0x0403);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a new reader starting at a specific position.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                offset: self.position,
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a big-endian u16.
    #[inline]
    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.read_bytes(2).map(BigEndian::read_u16)
    }

    /// Read a big-endian u32.
    #[inline]
    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.read_bytes(4).map(BigEndian::read_u32)
    }

    /// Read a big-endian u64.
    #[inline]
    pub fn read_u64_be(&mut self) -> Result<u64> {
        self.read_bytes(8).map(BigEndian::read_u64)
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    /// Read a little-endian i16.
    #[inline]
    pub fn read_i16_le(&mut self) -> Result<i16> {
        self.read_bytes(2).map(LittleEndian::read_i16)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32_le(&mut self) -> Result<i32> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32_le(&mut self) -> Result<f32> {
        self.read_bytes(4).map(LittleEndian::read_f32)
    }

    /// Read a UTF-8 string of a specific byte length.
    pub fn read_string(&mut self, length: usize) -> Result<&'a str> {
        let bytes = self.read_bytes(length)?;
        std::str::from_utf8(bytes).map_err(Error::Utf8)
    }
}
