//! IBX1 binary tree format codec.
//!
//! IBX1 is a compact binary encoding of a tree of named nodes carrying typed
//! properties. A file holds a deduplicated string table, a typed-value table
//! and a root node whose properties and children refer into those tables by
//! index. This crate decodes and encodes the format and converts documents
//! to and from an XML form that is easy to read and edit.
//!
//! # File Layout
//!
//! - `IBX1` signature
//! - String table: count, then length-prefixed NUL-terminated UTF-8 strings
//! - Typed-value table: count, then tagged values
//! - Encoding flag byte (`0x01`)
//! - Root node, recursively: marker, name, property and child counts,
//!   properties, children
//!
//! Counts and indices use a variable-width integer encoding, see [`number`].
//!
//! # Example
//!
//! ```no_run
//! use ibx_format::{Decoded, Document, RenderOptions};
//!
//! let data = std::fs::read("settings.dat")?;
//!
//! match Document::decode(&data)? {
//!     Decoded::Document(document) => {
//!         println!("{}", document.to_xml_string(&RenderOptions::default())?);
//!     }
//!     Decoded::Passthrough(bytes) => println!("not IBX1, {} bytes", bytes.len()),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod document;
mod error;
pub mod header;
mod node;
pub mod number;
mod options;
mod property;
mod table;
mod tree;
mod value;

#[cfg(feature = "xml")]
mod from_xml;
#[cfg(feature = "xml")]
mod xml;

pub use builder::DocumentBuilder;
pub use document::{Decoded, Document};
pub use error::{Error, Result};
pub use header::MAGIC;
pub use node::{Node, MAX_DEPTH};
pub use options::{BuildOptions, RenderOptions};
pub use property::Property;
pub use table::{StringTable, ValueTable};
pub use tree::{Element, PropertyEntry};
pub use value::{TypedValue, ValueKind};
