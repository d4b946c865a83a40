//! IBX1 document decoding and encoding.

use ibx_common::{BinaryReader, BinaryWriter};

use crate::header::{is_ibx, ENCODING_FLAG, MAGIC, MAGIC_LEN};
use crate::node::TableSizes;
use crate::number::{read_count, write_number};
use crate::{Error, Node, Result, TypedValue};

/// A fully materialized IBX1 document.
///
/// Holds the string table, the typed-value table and the root node. Every
/// index held by a node, property or string reference is valid for these
/// tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    strings: Vec<String>,
    values: Vec<TypedValue>,
    root: Node,
    encoding_flag: u8,
}

/// Result of decoding a byte stream that may or may not be IBX1.
#[derive(Debug)]
pub enum Decoded<'a> {
    /// The input was an IBX1 document.
    Document(Document),
    /// The input has no IBX1 signature and should be copied unchanged.
    Passthrough(&'a [u8]),
}

impl Document {
    /// Create a document from its parts, validating every index.
    pub fn new(strings: Vec<String>, values: Vec<TypedValue>, root: Node) -> Result<Self> {
        let document = Self {
            strings,
            values,
            root,
            encoding_flag: ENCODING_FLAG,
        };
        document.validate()?;
        Ok(document)
    }

    /// Assemble a document whose indices are valid by construction.
    pub(crate) fn from_parts(strings: Vec<String>, values: Vec<TypedValue>, root: Node) -> Self {
        Self {
            strings,
            values,
            root,
            encoding_flag: ENCODING_FLAG,
        }
    }

    /// Check if data is an IBX1 file by checking the magic bytes.
    pub fn is_ibx(data: &[u8]) -> bool {
        is_ibx(data)
    }

    /// Decode a byte stream, passing through anything without the signature.
    ///
    /// # Example
    ///
    /// ```
    /// use ibx_format::{Decoded, Document};
    ///
    /// let data = b"plain text, not IBX1";
    /// assert!(matches!(Document::decode(data)?, Decoded::Passthrough(bytes) if bytes == data));
    /// # Ok::<(), ibx_format::Error>(())
    /// ```
    pub fn decode(data: &[u8]) -> Result<Decoded<'_>> {
        match Self::parse(data) {
            Ok(document) => Ok(Decoded::Document(document)),
            Err(Error::SignatureMismatch { .. }) => {
                log::warn!("input has no IBX1 signature, passing through {} bytes", data.len());
                Ok(Decoded::Passthrough(data))
            }
            Err(e) => Err(e),
        }
    }

    /// Parse an IBX1 document from bytes.
    ///
    /// Unlike [`Document::decode`], a missing signature is an error.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if !is_ibx(data) {
            return Err(Error::SignatureMismatch {
                actual: data[..MAGIC_LEN.min(data.len())].to_vec(),
            });
        }

        let mut reader = BinaryReader::new_at(data, MAGIC_LEN);

        let string_count = read_count(&mut reader)?;
        let mut strings = Vec::with_capacity(string_count.min(reader.remaining() / 2));
        for _ in 0..string_count {
            strings.push(read_string(&mut reader)?);
        }
        log::trace!("read {} strings", strings.len());

        let value_count = read_count(&mut reader)?;
        let mut values = Vec::with_capacity(value_count.min(reader.remaining()));
        for _ in 0..value_count {
            let offset = reader.position();
            let value = TypedValue::read(&mut reader)?;
            if let TypedValue::StringRef(index) = value {
                if index as usize >= strings.len() {
                    log::debug!("string reference at offset {} is out of bounds", offset);
                    return Err(Error::IndexOutOfBounds {
                        table: "string",
                        index: u64::from(index),
                        len: strings.len(),
                    });
                }
            }
            values.push(value);
        }
        log::trace!("read {} typed values", values.len());

        let encoding_flag = reader.read_u8()?;
        if encoding_flag != ENCODING_FLAG {
            log::debug!("unusual encoding flag 0x{:02x}", encoding_flag);
        }

        let sizes = TableSizes {
            strings: strings.len(),
            values: values.len(),
        };
        let root = Node::read(&mut reader, sizes)?;

        if !reader.is_empty() {
            log::debug!(
                "ignoring {} trailing bytes after root node at offset {}",
                reader.remaining(),
                reader.position()
            );
        }

        log::debug!(
            "decoded IBX1 document: {} strings, {} typed values, {} nodes",
            strings.len(),
            values.len(),
            root.count()
        );

        Ok(Self {
            strings,
            values,
            root,
            encoding_flag,
        })
    }

    /// Encode the document to IBX1 bytes.
    ///
    /// The encoding flag is always written as `0x01`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let string_bytes: usize = self.strings.iter().map(|s| s.len() + 2).sum();
        let mut writer = BinaryWriter::with_capacity(MAGIC_LEN + string_bytes + self.values.len() * 2);

        writer.write_bytes(MAGIC);

        write_number(&mut writer, self.strings.len() as u64);
        for s in &self.strings {
            write_number(&mut writer, s.len() as u64);
            writer.write_bytes(s.as_bytes());
            writer.write_u8(0);
        }

        write_number(&mut writer, self.values.len() as u64);
        for value in &self.values {
            value.write(&mut writer);
        }

        writer.write_u8(ENCODING_FLAG);
        self.root.write(&mut writer)?;

        Ok(writer.into_inner())
    }

    /// The string table, in index order.
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// The typed-value table, in index order.
    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The encoding flag read from the input (`0x01` for built documents).
    pub fn encoding_flag(&self) -> u8 {
        self.encoding_flag
    }

    /// Get a string by index.
    pub fn string(&self, index: u32) -> Result<&str> {
        self.strings
            .get(index as usize)
            .map(String::as_str)
            .ok_or(Error::IndexOutOfBounds {
                table: "string",
                index: u64::from(index),
                len: self.strings.len(),
            })
    }

    /// Get a typed value by index.
    pub fn value(&self, index: u32) -> Result<&TypedValue> {
        self.values.get(index as usize).ok_or(Error::IndexOutOfBounds {
            table: "typed-value",
            index: u64::from(index),
            len: self.values.len(),
        })
    }

    fn validate(&self) -> Result<()> {
        for value in &self.values {
            if let TypedValue::StringRef(index) = value {
                self.string(*index)?;
            }
        }

        let mut pending = vec![(&self.root, 1usize)];
        while let Some((node, depth)) = pending.pop() {
            if depth > crate::MAX_DEPTH {
                return Err(Error::NestingTooDeep { max: crate::MAX_DEPTH });
            }
            self.string(node.name)?;
            for property in &node.properties {
                self.string(property.name)?;
                self.value(property.value)?;
            }
            pending.extend(node.children.iter().map(|child| (child, depth + 1)));
        }

        Ok(())
    }
}

/// Read one string table entry: length, UTF-8 bytes, NUL terminator.
fn read_string(reader: &mut BinaryReader<'_>) -> Result<String> {
    let length = read_count(reader)?;
    let s = reader.read_string(length)?.to_string();

    let offset = reader.position();
    let terminator = reader.read_u8()?;
    if terminator != 0 {
        return Err(Error::MalformedString {
            offset,
            found: terminator,
        });
    }

    Ok(s)
}
