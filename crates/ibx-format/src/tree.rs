//! Abstract element tree exchanged with text formats.
//!
//! This is the shape of an IBX1 document with every index resolved: names
//! are plain strings and values are `(kind, text)` pairs. The XML bridge
//! reads and writes this tree; the binary codec never sees markup.

use crate::ValueKind;

/// A named element with typed properties and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    /// Element name.
    pub name: String,
    /// Properties in document order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub properties: Vec<PropertyEntry>,
    /// Child elements in document order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<Element>,
}

/// A property as text: name, declared type and value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyEntry {
    /// Property name.
    pub name: String,
    /// Declared value type.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ValueKind,
    /// Value text.
    pub value: String,
}

impl PropertyEntry {
    /// Create a property entry.
    pub fn new(name: impl Into<String>, kind: ValueKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }
}

impl Element {
    /// Create an element with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a property.
    pub fn property(mut self, name: impl Into<String>, kind: ValueKind, value: impl Into<String>) -> Self {
        self.properties.push(PropertyEntry::new(name, kind, value));
        self
    }

    /// Add a child element.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Add multiple children.
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Total number of elements in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Element::count).sum::<usize>()
    }
}
