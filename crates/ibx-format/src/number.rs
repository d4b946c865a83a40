//! Variable-width number encoding.
//!
//! Lengths, counts and indices are stored as tag-prefixed numbers. The first
//! byte either holds a small value directly or names the width of the
//! big-endian value that follows:
//!
//! | value range       | encoding                    |
//! |-------------------|-----------------------------|
//! | `< 0x40`          | the value itself            |
//! | `< 0x100`         | `0x40` + 1 byte             |
//! | `< 0x10000`       | `0x80` + 2 bytes BE         |
//! | `< 0x100000000`   | `0xc0` + 4 bytes BE         |
//! | anything larger   | `0xf0` + 8 bytes BE         |

use ibx_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

const INLINE_LIMIT: u64 = 0x40;
const TAG_U8: u8 = 0x40;
const TAG_U16: u8 = 0x80;
const TAG_U32: u8 = 0xc0;
const TAG_U64: u8 = 0xf0;

/// Write a number using the smallest encoding that holds it.
pub fn write_number(writer: &mut BinaryWriter, value: u64) {
    if value < INLINE_LIMIT {
        writer.write_u8(value as u8);
    } else if value <= u64::from(u8::MAX) {
        writer.write_u8(TAG_U8);
        writer.write_u8(value as u8);
    } else if value <= u64::from(u16::MAX) {
        writer.write_u8(TAG_U16);
        writer.write_u16_be(value as u16);
    } else if value <= u64::from(u32::MAX) {
        writer.write_u8(TAG_U32);
        writer.write_u32_be(value as u32);
    } else {
        writer.write_u8(TAG_U64);
        writer.write_u64_be(value);
    }
}

/// Read a number, dispatching on the exact value of the leading byte.
pub fn read_number(reader: &mut BinaryReader<'_>) -> Result<u64> {
    let offset = reader.position();
    let tag = reader.read_u8()?;
    match tag {
        0x00..=0x3f => Ok(u64::from(tag)),
        TAG_U8 => Ok(u64::from(reader.read_u8()?)),
        TAG_U16 => Ok(u64::from(reader.read_u16_be()?)),
        TAG_U32 => Ok(u64::from(reader.read_u32_be()?)),
        TAG_U64 => Ok(reader.read_u64_be()?),
        _ => Err(Error::MalformedNumber { tag, offset }),
    }
}

/// Read a number that must index into a table of `len` entries.
pub(crate) fn read_index(
    reader: &mut BinaryReader<'_>,
    table: &'static str,
    len: usize,
) -> Result<u32> {
    let index = read_number(reader)?;
    checked_index(index, table, len)
}

/// Validate an index against a table length and narrow it.
pub(crate) fn checked_index(index: u64, table: &'static str, len: usize) -> Result<u32> {
    match u32::try_from(index) {
        Ok(narrow) if (narrow as usize) < len => Ok(narrow),
        _ => Err(Error::IndexOutOfBounds { table, index, len }),
    }
}

/// Read an element count.
///
/// Counts that do not fit in `usize` saturate; the reads that follow will
/// run out of input long before reaching them.
pub(crate) fn read_count(reader: &mut BinaryReader<'_>) -> Result<usize> {
    let count = read_number(reader)?;
    Ok(usize::try_from(count).unwrap_or(usize::MAX))
}
