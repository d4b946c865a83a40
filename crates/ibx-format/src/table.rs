//! Interning tables for strings and typed values.
//!
//! Both tables are append-only: entries are never removed or changed, so
//! the indices they hand out stay valid for the table's lifetime.

use rustc_hash::FxHashMap;

use crate::{Error, Result, TypedValue, ValueKind};

/// Deduplicating string table. Indices follow first-seen order.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
    indices: FxHashMap<String, u32>,
}

impl StringTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `s`, appending it if it has not been seen.
    pub fn intern(&mut self, s: &str) -> Result<u32> {
        if let Some(&index) = self.indices.get(s) {
            return Ok(index);
        }

        let index = next_index(self.strings.len(), "string")?;
        self.strings.push(s.to_string());
        self.indices.insert(s.to_string(), index);
        Ok(index)
    }

    /// Get a string by index.
    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    /// Number of strings in the table.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// The strings in index order.
    pub fn as_slice(&self) -> &[String] {
        &self.strings
    }

    /// Consume the table and return the strings in index order.
    pub fn into_vec(self) -> Vec<String> {
        self.strings
    }
}

/// Typed-value table keyed by `(kind, text)`.
///
/// With sharing enabled, properties whose type and text match reuse one
/// entry. With sharing disabled every interned value gets its own entry.
#[derive(Debug, Clone)]
pub struct ValueTable {
    values: Vec<TypedValue>,
    keys: FxHashMap<(ValueKind, String), u32>,
    share: bool,
}

impl ValueTable {
    /// Create an empty table.
    pub fn new(share: bool) -> Self {
        Self {
            values: Vec::new(),
            keys: FxHashMap::default(),
            share,
        }
    }

    /// Return the index of the value `text` of type `kind`.
    ///
    /// String values are interned into `strings` as a side effect of
    /// parsing. A value that fails to parse leaves the table unchanged.
    pub fn intern(&mut self, kind: ValueKind, text: &str, strings: &mut StringTable) -> Result<u32> {
        if self.share {
            if let Some(&index) = self.keys.get(&(kind, text.to_string())) {
                return Ok(index);
            }
        }

        let value = TypedValue::parse(kind, text, strings)?;
        let index = next_index(self.values.len(), "typed-value")?;
        self.values.push(value);
        if self.share {
            self.keys.insert((kind, text.to_string()), index);
        }
        Ok(index)
    }

    /// Get a value by index.
    pub fn get(&self, index: u32) -> Option<&TypedValue> {
        self.values.get(index as usize)
    }

    /// Number of values in the table.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the table and return the values in index order.
    pub fn into_vec(self) -> Vec<TypedValue> {
        self.values
    }
}

fn next_index(len: usize, table: &'static str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::TableOverflow { table })
}
