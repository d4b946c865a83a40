//! IBX1 property encoding.

use ibx_common::{BinaryReader, BinaryWriter};

use crate::number::{checked_index, read_index, write_number};
use crate::{Error, Result};

/// Name indices below this are folded into the tag byte.
const NAME_INLINE_LIMIT: u32 = 0x20;
const TAG_NAME_INLINE: u8 = 0x80;
const TAG_NAME_INLINE_END: u8 = 0x9f;
const TAG_NAME_U8: u8 = 0xa0;
const TAG_NAME_U16: u8 = 0xc0;

/// A property of a node.
///
/// Properties do not own their value: they refer into the document's
/// typed-value table, so several properties may share one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Property {
    /// Index of the property name in the string table.
    pub name: u32,
    /// Index of the value in the typed-value table.
    pub value: u32,
}

impl Property {
    /// Create a property from a name index and a value index.
    pub fn new(name: u32, value: u32) -> Self {
        Self { name, value }
    }

    /// Write the biased name tag followed by the value index.
    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        if self.name < NAME_INLINE_LIMIT {
            writer.write_u8(TAG_NAME_INLINE + self.name as u8);
        } else if self.name <= u32::from(u8::MAX) {
            writer.write_u8(TAG_NAME_U8);
            writer.write_u8(self.name as u8);
        } else if self.name <= u32::from(u16::MAX) {
            writer.write_u8(TAG_NAME_U16);
            writer.write_u16_be(self.name as u16);
        } else {
            return Err(Error::PropertyNameOutOfRange(self.name));
        }
        write_number(writer, u64::from(self.value));
        Ok(())
    }

    /// Read a property, checking both indices against the table sizes.
    pub fn read(reader: &mut BinaryReader<'_>, string_count: usize, value_count: usize) -> Result<Self> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        let name = match tag {
            TAG_NAME_INLINE..=TAG_NAME_INLINE_END => u64::from(tag - TAG_NAME_INLINE),
            TAG_NAME_U8 => u64::from(reader.read_u8()?),
            TAG_NAME_U16 => u64::from(reader.read_u16_be()?),
            _ => return Err(Error::MalformedProperty { tag, offset }),
        };
        let name = checked_index(name, "string", string_count)?;
        let value = read_index(reader, "typed-value", value_count)?;
        Ok(Self { name, value })
    }
}
