//! Error types for IBX1 decoding and encoding.

use thiserror::Error;

use crate::ValueKind;

/// Errors that can occur when decoding or encoding IBX1 documents.
#[derive(Debug, Error)]
pub enum Error {
    /// Byte-level read error (usually truncated input).
    #[error("{0}")]
    Common(#[from] ibx_common::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The input does not start with the `IBX1` signature.
    #[error("not an IBX1 file: expected 'IBX1', got {actual:?}")]
    SignatureMismatch { actual: Vec<u8> },

    /// Unrecognized leading byte of a variable-width number.
    #[error("malformed number: unknown tag 0x{tag:02x} at offset {offset}")]
    MalformedNumber { tag: u8, offset: usize },

    /// Unrecognized typed-value tag.
    #[error("malformed typed value: unknown tag 0x{tag:02x} at offset {offset}")]
    MalformedTypedValue { tag: u8, offset: usize },

    /// Unrecognized property tag.
    #[error("malformed property: unknown tag 0x{tag:02x} at offset {offset}")]
    MalformedProperty { tag: u8, offset: usize },

    /// A node did not start with the element marker.
    #[error("malformed node: expected element marker 0x00, got 0x{tag:02x} at offset {offset}")]
    MalformedNode { tag: u8, offset: usize },

    /// A string table entry was not followed by its NUL terminator.
    #[error("malformed string: expected NUL terminator at offset {offset}, got 0x{found:02x}")]
    MalformedString { offset: usize, found: u8 },

    /// An index points past the end of its table.
    #[error("{table} index {index} out of bounds (table size: {len})")]
    IndexOutOfBounds {
        table: &'static str,
        index: u64,
        len: usize,
    },

    /// The node tree is nested deeper than the decoder allows.
    #[error("node nesting exceeds maximum depth of {max}")]
    NestingTooDeep { max: usize },

    /// A property name index cannot be expressed by the property encoding.
    #[error("property name index {0} exceeds the 16-bit property name range")]
    PropertyNameOutOfRange(u32),

    /// An interning table outgrew the 32-bit index space.
    #[error("{table} table exceeds the 32-bit index space")]
    TableOverflow { table: &'static str },

    /// A textual property value could not be parsed for its declared type.
    #[error("cannot parse {value:?} as {kind}")]
    ValueParse { kind: ValueKind, value: String },

    /// A textual type tag is not one of the known value kinds.
    #[error("unknown value type: {0:?}")]
    UnknownValueKind(String),

    /// An element carries attributes, which IBX1 cannot represent.
    #[error("element <{element}> has attributes, which IBX1 cannot represent")]
    UnsupportedAttributes { element: String },

    /// The XML input holds no element at all.
    #[error("no root element found in XML")]
    NoRootElement,

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    Xml(String),
}

/// Result type for IBX1 operations.
pub type Result<T> = std::result::Result<T, Error>;
