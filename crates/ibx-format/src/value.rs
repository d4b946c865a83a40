//! Typed property values.
//!
//! Every value in the typed-value table starts with a tag byte. Small
//! integers and low string indices are folded into the tag itself; other
//! values carry a payload whose width the tag names.
//!
//! Integer and float payloads are little-endian, while multi-byte string
//! indices are big-endian like the rest of the framing.

use std::fmt;
use std::str::FromStr;

use ibx_common::{BinaryReader, BinaryWriter};

use crate::{Error, RenderOptions, Result, StringTable};

mod tag {
    /// Integers of 8 bits below this are stored as the tag byte.
    pub const INLINE_INT_LIMIT: u8 = 0x10;
    pub const INT8: u8 = 0x10;
    pub const INT16: u8 = 0x20;
    pub const INT32: u8 = 0x30;
    pub const BOOL_FALSE: u8 = 0x40;
    pub const BOOL_TRUE: u8 = 0x41;
    pub const FLOAT: u8 = 0xb0;
    /// String indices below 0x10 are added to this tag.
    pub const STRING_INLINE: u8 = 0xc0;
    pub const STRING_INLINE_END: u8 = 0xcf;
    pub const STRING_U8: u8 = 0xd0;
    pub const STRING_U16: u8 = 0xe0;
    pub const STRING_U32: u8 = 0xf0;
}

/// The textual type of a property, as exchanged with the XML form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValueKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Bool,
    Float,
    String,
}

impl ValueKind {
    /// All kinds, in display order.
    pub const ALL: [ValueKind; 9] = [
        ValueKind::Int8,
        ValueKind::UInt8,
        ValueKind::Int16,
        ValueKind::UInt16,
        ValueKind::Int32,
        ValueKind::UInt32,
        ValueKind::Bool,
        ValueKind::Float,
        ValueKind::String,
    ];

    /// The canonical type name used in XML.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Int8 => "int8",
            ValueKind::UInt8 => "uint8",
            ValueKind::Int16 => "int16",
            ValueKind::UInt16 => "uint16",
            ValueKind::Int32 => "int32",
            ValueKind::UInt32 => "uint32",
            ValueKind::Bool => "bool",
            ValueKind::Float => "float",
            ValueKind::String => "string",
        }
    }

    /// Look up a kind by type name. Accepts the legacy `byte`, `short` and
    /// `int` aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "int8" | "byte" => ValueKind::Int8,
            "uint8" => ValueKind::UInt8,
            "int16" | "short" => ValueKind::Int16,
            "uint16" => ValueKind::UInt16,
            "int32" | "int" => ValueKind::Int32,
            "uint32" => ValueKind::UInt32,
            "bool" => ValueKind::Bool,
            "float" => ValueKind::Float,
            "string" => ValueKind::String,
            _ => return None,
        };
        Some(kind)
    }
}

impl FromStr for ValueKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| Error::UnknownValueKind(s.to_string()))
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value stored in the typed-value table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    Bool(bool),
    Float(f32),
    /// Index into the document's string table.
    StringRef(u32),
}

impl TypedValue {
    /// The textual kind of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            TypedValue::Int8(_) => ValueKind::Int8,
            TypedValue::Int16(_) => ValueKind::Int16,
            TypedValue::Int32(_) => ValueKind::Int32,
            TypedValue::UInt8(_) => ValueKind::UInt8,
            TypedValue::UInt16(_) => ValueKind::UInt16,
            TypedValue::UInt32(_) => ValueKind::UInt32,
            TypedValue::Bool(_) => ValueKind::Bool,
            TypedValue::Float(_) => ValueKind::Float,
            TypedValue::StringRef(_) => ValueKind::String,
        }
    }

    /// The tag byte this value encodes with.
    pub fn tag(&self) -> u8 {
        match *self {
            TypedValue::Int8(v) if (0..tag::INLINE_INT_LIMIT as i8).contains(&v) => v as u8,
            TypedValue::UInt8(v) if v < tag::INLINE_INT_LIMIT => v,
            TypedValue::Int8(_) | TypedValue::UInt8(_) => tag::INT8,
            TypedValue::Int16(_) | TypedValue::UInt16(_) => tag::INT16,
            TypedValue::Int32(_) | TypedValue::UInt32(_) => tag::INT32,
            TypedValue::Bool(false) => tag::BOOL_FALSE,
            TypedValue::Bool(true) => tag::BOOL_TRUE,
            TypedValue::Float(_) => tag::FLOAT,
            TypedValue::StringRef(index) if index < 0x10 => tag::STRING_INLINE + index as u8,
            TypedValue::StringRef(index) if index <= u32::from(u8::MAX) => tag::STRING_U8,
            TypedValue::StringRef(index) if index <= u32::from(u16::MAX) => tag::STRING_U16,
            TypedValue::StringRef(_) => tag::STRING_U32,
        }
    }

    /// Write the tag byte and payload.
    pub fn write(&self, writer: &mut BinaryWriter) {
        let tag = self.tag();
        writer.write_u8(tag);
        match (*self, tag) {
            (TypedValue::Int8(v), tag::INT8) => writer.write_i8(v),
            (TypedValue::UInt8(v), tag::INT8) => writer.write_u8(v),
            (TypedValue::Int8(_) | TypedValue::UInt8(_), _) => {}
            (TypedValue::Int16(v), _) => writer.write_i16_le(v),
            (TypedValue::UInt16(v), _) => writer.write_u16_le(v),
            (TypedValue::Int32(v), _) => writer.write_i32_le(v),
            (TypedValue::UInt32(v), _) => writer.write_u32_le(v),
            (TypedValue::Bool(_), _) => {}
            (TypedValue::Float(v), _) => writer.write_f32_le(v),
            (TypedValue::StringRef(index), tag::STRING_U8) => writer.write_u8(index as u8),
            (TypedValue::StringRef(index), tag::STRING_U16) => writer.write_u16_be(index as u16),
            (TypedValue::StringRef(index), tag::STRING_U32) => writer.write_u32_be(index),
            (TypedValue::StringRef(_), _) => {}
        }
    }

    /// Read a value, dispatching on its tag byte.
    ///
    /// The tags do not record signedness, so integers always come back as
    /// the signed variant with the stored bit pattern.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        let value = match tag {
            0x00..=0x0f => TypedValue::Int8(tag as i8),
            tag::INT8 => TypedValue::Int8(reader.read_i8()?),
            tag::INT16 => TypedValue::Int16(reader.read_i16_le()?),
            tag::INT32 => TypedValue::Int32(reader.read_i32_le()?),
            tag::BOOL_FALSE => TypedValue::Bool(false),
            tag::BOOL_TRUE => TypedValue::Bool(true),
            tag::FLOAT => TypedValue::Float(reader.read_f32_le()?),
            tag::STRING_INLINE..=tag::STRING_INLINE_END => {
                TypedValue::StringRef(u32::from(tag - tag::STRING_INLINE))
            }
            tag::STRING_U8 => TypedValue::StringRef(u32::from(reader.read_u8()?)),
            tag::STRING_U16 => TypedValue::StringRef(u32::from(reader.read_u16_be()?)),
            tag::STRING_U32 => TypedValue::StringRef(reader.read_u32_be()?),
            _ => return Err(Error::MalformedTypedValue { tag, offset }),
        };
        Ok(value)
    }

    /// Parse a textual value of the given kind.
    ///
    /// String values are interned into `strings`.
    ///
    /// Integer kinds take a decimal literal in range for the kind, or a
    /// `0x`-prefixed hexadecimal literal giving the unsigned bit pattern of
    /// the kind's width.
    pub fn parse(kind: ValueKind, text: &str, strings: &mut StringTable) -> Result<Self> {
        let value = match kind {
            ValueKind::Int8 => TypedValue::Int8(parse_integer(kind, text, |bits| {
                u8::try_from(bits).ok().map(|b| b as i8)
            })?),
            ValueKind::UInt8 => {
                TypedValue::UInt8(parse_integer(kind, text, |bits| u8::try_from(bits).ok())?)
            }
            ValueKind::Int16 => TypedValue::Int16(parse_integer(kind, text, |bits| {
                u16::try_from(bits).ok().map(|b| b as i16)
            })?),
            ValueKind::UInt16 => {
                TypedValue::UInt16(parse_integer(kind, text, |bits| u16::try_from(bits).ok())?)
            }
            ValueKind::Int32 => TypedValue::Int32(parse_integer(kind, text, |bits| {
                u32::try_from(bits).ok().map(|b| b as i32)
            })?),
            ValueKind::UInt32 => {
                TypedValue::UInt32(parse_integer(kind, text, |bits| u32::try_from(bits).ok())?)
            }
            ValueKind::Bool => match text {
                "true" => TypedValue::Bool(true),
                "false" => TypedValue::Bool(false),
                _ => return Err(parse_error(kind, text)),
            },
            ValueKind::Float => {
                TypedValue::Float(text.parse().map_err(|_| parse_error(kind, text))?)
            }
            ValueKind::String => TypedValue::StringRef(strings.intern(text)?),
        };
        Ok(value)
    }

    /// Render the value as its kind and text.
    ///
    /// Floats use the shortest text that parses back to the same `f32`.
    pub fn render(&self, strings: &[String], options: &RenderOptions) -> Result<(ValueKind, String)> {
        let text = match *self {
            TypedValue::Int8(v) if options.hex8 => format!("0x{:02X}", v as u8),
            TypedValue::UInt8(v) if options.hex8 => format!("0x{:02X}", v),
            TypedValue::Int16(v) if options.hex16 => format!("0x{:04X}", v as u16),
            TypedValue::UInt16(v) if options.hex16 => format!("0x{:04X}", v),
            TypedValue::Int32(v) if options.hex32 => format!("0x{:08X}", v as u32),
            TypedValue::UInt32(v) if options.hex32 => format!("0x{:08X}", v),
            TypedValue::Int8(v) => v.to_string(),
            TypedValue::UInt8(v) => v.to_string(),
            TypedValue::Int16(v) => v.to_string(),
            TypedValue::UInt16(v) => v.to_string(),
            TypedValue::Int32(v) => v.to_string(),
            TypedValue::UInt32(v) => v.to_string(),
            TypedValue::Bool(v) => v.to_string(),
            TypedValue::Float(v) => v.to_string(),
            TypedValue::StringRef(index) => strings
                .get(index as usize)
                .cloned()
                .ok_or(Error::IndexOutOfBounds {
                    table: "string",
                    index: u64::from(index),
                    len: strings.len(),
                })?,
        };
        Ok((self.kind(), text))
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{0x{:02x} {} ", self.tag(), self.kind())?;
        match self {
            TypedValue::Int8(v) => write!(f, "{}", v)?,
            TypedValue::Int16(v) => write!(f, "{}", v)?,
            TypedValue::Int32(v) => write!(f, "{}", v)?,
            TypedValue::UInt8(v) => write!(f, "{}", v)?,
            TypedValue::UInt16(v) => write!(f, "{}", v)?,
            TypedValue::UInt32(v) => write!(f, "{}", v)?,
            TypedValue::Bool(v) => write!(f, "{}", v)?,
            TypedValue::Float(v) => write!(f, "{}", v)?,
            TypedValue::StringRef(index) => write!(f, "#{}", index)?,
        }
        f.write_str("}")
    }
}

fn parse_error(kind: ValueKind, text: &str) -> Error {
    Error::ValueParse {
        kind,
        value: text.to_string(),
    }
}

fn parse_integer<T: FromStr>(
    kind: ValueKind,
    text: &str,
    from_bits: impl FnOnce(u64) -> Option<T>,
) -> Result<T> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) if !digits.starts_with('+') => {
            u64::from_str_radix(digits, 16).ok().and_then(from_bits)
        }
        Some(_) => None,
        None => text.parse::<T>().ok(),
    };
    parsed.ok_or_else(|| parse_error(kind, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: TypedValue) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        value.write(&mut writer);
        writer.into_inner()
    }

    fn decode(bytes: &[u8]) -> Result<TypedValue> {
        let mut reader = BinaryReader::new(bytes);
        let value = TypedValue::read(&mut reader)?;
        assert!(reader.is_empty(), "trailing bytes after value");
        Ok(value)
    }

    fn round_trip(value: TypedValue) -> TypedValue {
        decode(&encode(value)).unwrap()
    }

    #[test]
    fn test_int8_inline_boundary() {
        assert_eq!(encode(TypedValue::Int8(0x0f)), vec![0x0f]);
        assert_eq!(encode(TypedValue::Int8(0x10)), vec![0x10, 0x10]);
        assert_eq!(encode(TypedValue::Int8(-1)), vec![0x10, 0xff]);
        assert_eq!(encode(TypedValue::Int8(0)), vec![0x00]);

        assert_eq!(round_trip(TypedValue::Int8(0x0f)), TypedValue::Int8(0x0f));
        assert_eq!(round_trip(TypedValue::Int8(0x10)), TypedValue::Int8(0x10));
        assert_eq!(round_trip(TypedValue::Int8(i8::MIN)), TypedValue::Int8(i8::MIN));
        assert_eq!(round_trip(TypedValue::Int8(i8::MAX)), TypedValue::Int8(i8::MAX));
    }

    #[test]
    fn test_unsigned_round_trips_bit_pattern() {
        assert_eq!(encode(TypedValue::UInt8(0x0f)), vec![0x0f]);
        assert_eq!(encode(TypedValue::UInt8(200)), vec![0x10, 200]);
        assert_eq!(round_trip(TypedValue::UInt8(200)), TypedValue::Int8(-56));
        assert_eq!(round_trip(TypedValue::UInt16(0xffff)), TypedValue::Int16(-1));
        assert_eq!(round_trip(TypedValue::UInt32(0x8000_0000)), TypedValue::Int32(i32::MIN));

        for value in [TypedValue::UInt8(200), TypedValue::UInt16(40000), TypedValue::UInt32(u32::MAX)] {
            assert_eq!(encode(round_trip(value)), encode(value));
        }
    }

    #[test]
    fn test_wide_integers_are_little_endian() {
        assert_eq!(encode(TypedValue::Int16(0x0102)), vec![0x20, 0x02, 0x01]);
        assert_eq!(encode(TypedValue::Int32(0x0102_0304)), vec![0x30, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(encode(TypedValue::Int16(3)), vec![0x20, 0x03, 0x00]);

        assert_eq!(round_trip(TypedValue::Int16(i16::MIN)), TypedValue::Int16(i16::MIN));
        assert_eq!(round_trip(TypedValue::Int32(-123_456)), TypedValue::Int32(-123_456));
    }

    #[test]
    fn test_bool_and_float() {
        assert_eq!(encode(TypedValue::Bool(false)), vec![0x40]);
        assert_eq!(encode(TypedValue::Bool(true)), vec![0x41]);
        assert_eq!(round_trip(TypedValue::Bool(true)), TypedValue::Bool(true));

        let mut expected = vec![0xb0];
        expected.extend_from_slice(&1.5f32.to_le_bytes());
        assert_eq!(encode(TypedValue::Float(1.5)), expected);

        match round_trip(TypedValue::Float(-0.1)) {
            TypedValue::Float(v) => assert_eq!(v.to_bits(), (-0.1f32).to_bits()),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_string_ref_widths() {
        assert_eq!(encode(TypedValue::StringRef(0x0f)), vec![0xcf]);
        assert_eq!(encode(TypedValue::StringRef(0x10)), vec![0xd0, 0x10]);
        assert_eq!(encode(TypedValue::StringRef(0xff)), vec![0xd0, 0xff]);
        assert_eq!(encode(TypedValue::StringRef(0x100)), vec![0xe0, 0x01, 0x00]);
        assert_eq!(encode(TypedValue::StringRef(0xffff)), vec![0xe0, 0xff, 0xff]);
        assert_eq!(
            encode(TypedValue::StringRef(0x10000)),
            vec![0xf0, 0x00, 0x01, 0x00, 0x00]
        );

        for index in [0u32, 0x0f, 0x10, 0xff, 0x100, 0xffff, 0x10000, u32::MAX] {
            assert_eq!(round_trip(TypedValue::StringRef(index)), TypedValue::StringRef(index));
        }
    }

    #[test]
    fn test_unknown_tags_are_errors() {
        for tag in [0x11u8, 0x21, 0x42, 0x50, 0xa0, 0xb1, 0xd1, 0xe1, 0xf1, 0xff] {
            match decode(&[tag, 0, 0, 0, 0]) {
                Err(Error::MalformedTypedValue { tag: found, offset: 0 }) => assert_eq!(found, tag),
                other => panic!("tag 0x{:02x}: expected MalformedTypedValue, got {:?}", tag, other),
            }
        }
    }

    #[test]
    fn test_kind_names() {
        for kind in ValueKind::ALL {
            assert_eq!(kind.as_str().parse::<ValueKind>().unwrap(), kind);
        }
        assert_eq!(ValueKind::from_name("byte"), Some(ValueKind::Int8));
        assert_eq!(ValueKind::from_name("short"), Some(ValueKind::Int16));
        assert_eq!(ValueKind::from_name("int"), Some(ValueKind::Int32));
        assert!(matches!("double".parse::<ValueKind>(), Err(Error::UnknownValueKind(_))));
    }

    #[test]
    fn test_parse_integers() {
        let mut strings = StringTable::new();
        let mut parse = |kind, text| TypedValue::parse(kind, text, &mut strings);

        assert_eq!(parse(ValueKind::Int8, "-128").unwrap(), TypedValue::Int8(-128));
        assert_eq!(parse(ValueKind::UInt8, "255").unwrap(), TypedValue::UInt8(255));
        assert_eq!(parse(ValueKind::Int16, "+12").unwrap(), TypedValue::Int16(12));
        assert_eq!(parse(ValueKind::UInt32, "4294967295").unwrap(), TypedValue::UInt32(u32::MAX));
        assert_eq!(parse(ValueKind::Int8, "0xFF").unwrap(), TypedValue::Int8(-1));
        assert_eq!(parse(ValueKind::Int16, "0x8000").unwrap(), TypedValue::Int16(i16::MIN));
        assert_eq!(parse(ValueKind::Int32, "0XdeadBEEF").unwrap(), TypedValue::Int32(0xdead_beefu32 as i32));

        for (kind, text) in [
            (ValueKind::Int8, "128"),
            (ValueKind::UInt8, "256"),
            (ValueKind::UInt8, "-1"),
            (ValueKind::Int8, "0x100"),
            (ValueKind::Int16, "70000"),
            (ValueKind::Int32, "1.5"),
            (ValueKind::Int32, ""),
            (ValueKind::Int32, " 5"),
            (ValueKind::UInt16, "0x"),
            (ValueKind::UInt16, "0x+1"),
        ] {
            assert!(
                matches!(parse(kind, text), Err(Error::ValueParse { .. })),
                "{} {:?} should fail",
                kind,
                text
            );
        }
    }

    #[test]
    fn test_parse_bool_float_string() {
        let mut strings = StringTable::new();

        assert_eq!(
            TypedValue::parse(ValueKind::Bool, "true", &mut strings).unwrap(),
            TypedValue::Bool(true)
        );
        assert!(TypedValue::parse(ValueKind::Bool, "True", &mut strings).is_err());
        assert!(TypedValue::parse(ValueKind::Bool, "1", &mut strings).is_err());

        assert_eq!(
            TypedValue::parse(ValueKind::Float, "0.5", &mut strings).unwrap(),
            TypedValue::Float(0.5)
        );
        assert!(TypedValue::parse(ValueKind::Float, "half", &mut strings).is_err());

        assert_eq!(
            TypedValue::parse(ValueKind::String, "hello", &mut strings).unwrap(),
            TypedValue::StringRef(0)
        );
        assert_eq!(strings.get(0), Some("hello"));
    }

    #[test]
    fn test_render() {
        let strings = vec!["Root".to_string()];
        let decimal = RenderOptions::default();
        let hex = RenderOptions {
            hex8: true,
            hex16: true,
            hex32: true,
        };

        let render = |value: TypedValue, options: &RenderOptions| {
            value.render(&strings, options).unwrap()
        };

        assert_eq!(render(TypedValue::Int8(-1), &decimal), (ValueKind::Int8, "-1".to_string()));
        assert_eq!(render(TypedValue::Int8(-1), &hex), (ValueKind::Int8, "0xFF".to_string()));
        assert_eq!(render(TypedValue::Int8(5), &hex).1, "0x05");
        assert_eq!(render(TypedValue::Int16(-2), &hex).1, "0xFFFE");
        assert_eq!(render(TypedValue::Int32(255), &hex).1, "0x000000FF");
        assert_eq!(render(TypedValue::UInt16(7), &decimal), (ValueKind::UInt16, "7".to_string()));
        assert_eq!(render(TypedValue::Bool(false), &hex).1, "false");
        assert_eq!(render(TypedValue::Float(0.1), &decimal).1, "0.1");
        assert_eq!(render(TypedValue::StringRef(0), &decimal), (ValueKind::String, "Root".to_string()));

        let only16 = RenderOptions {
            hex16: true,
            ..RenderOptions::default()
        };
        assert_eq!(render(TypedValue::Int8(10), &only16).1, "10");
        assert_eq!(render(TypedValue::Int16(10), &only16).1, "0x000A");
        assert_eq!(render(TypedValue::Int32(10), &only16).1, "10");

        assert!(matches!(
            TypedValue::StringRef(1).render(&strings, &decimal),
            Err(Error::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_rendered_text_parses_back() {
        let mut strings = StringTable::new();
        let hex = RenderOptions {
            hex8: true,
            hex16: true,
            hex32: true,
        };
        for value in [
            TypedValue::Int8(-56),
            TypedValue::Int16(-2),
            TypedValue::Int32(i32::MIN),
            TypedValue::Float(3.402_823_5e38),
            TypedValue::Float(1.0e-7),
        ] {
            for options in [RenderOptions::default(), hex] {
                let (kind, text) = value.render(&[], &options).unwrap();
                let parsed = TypedValue::parse(kind, &text, &mut strings).unwrap();
                assert_eq!(encode(parsed), encode(value), "{} via {:?}", value, text);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TypedValue::Bool(true).to_string(), "{0x41 bool true}");
        assert_eq!(TypedValue::Int8(3).to_string(), "{0x03 int8 3}");
        assert_eq!(TypedValue::StringRef(0x20).to_string(), "{0xd0 string #32}");
    }
}
