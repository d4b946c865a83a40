//! Binary writer backed by a growing byte buffer.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// An append-only output buffer.
///
/// Writes are infallible; the buffer grows as needed.
///
/// # Example
///
/// ```
/// use ibx_common::BinaryWriter;
///
/// let mut writer = BinaryWriter::new();
/// writer.write_u8(0x80);
/// writer.write_u16_be(0x0102);
/// writer.write_u16_le(0x0102);
///
/// assert_eq!(writer.into_inner(), vec![0x80, 0x01, 0x02, 0x02, 0x01]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create an empty writer with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing has been written yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View the written bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the writer and return the written bytes.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Append raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    /// Append a signed byte.
    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.data.push(value as u8);
    }

    /// Append a big-endian u16.
    #[inline]
    pub fn write_u16_be(&mut self, value: u16) {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, value);
        self.write_bytes(&buf);
    }

    /// Append a big-endian u32.
    #[inline]
    pub fn write_u32_be(&mut self, value: u32) {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, value);
        self.write_bytes(&buf);
    }

    /// Append a big-endian u64.
    #[inline]
    pub fn write_u64_be(&mut self, value: u64) {
        let mut buf = [0u8; 8];
        BigEndian::write_u64(&mut buf, value);
        self.write_bytes(&buf);
    }

    /// Append a little-endian u16.
    #[inline]
    pub fn write_u16_le(&mut self, value: u16) {
        let mut buf = [0u8; 2];
        LittleEndian::write_u16(&mut buf, value);
        self.write_bytes(&buf);
    }

    /// Append a little-endian i16.
    #[inline]
    pub fn write_i16_le(&mut self, value: i16) {
        let mut buf = [0u8; 2];
        LittleEndian::write_i16(&mut buf, value);
        self.write_bytes(&buf);
    }

    /// Append a little-endian u32.
    #[inline]
    pub fn write_u32_le(&mut self, value: u32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.write_bytes(&buf);
    }

    /// Append a little-endian i32.
    #[inline]
    pub fn write_i32_le(&mut self, value: i32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_i32(&mut buf, value);
        self.write_bytes(&buf);
    }

    /// Append a little-endian f32.
    #[inline]
    pub fn write_f32_le(&mut self, value: f32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_f32(&mut buf, value);
        self.write_bytes(&buf);
    }
}
