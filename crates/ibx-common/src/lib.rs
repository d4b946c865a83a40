//! Common utilities for IBX1 tooling.
//!
//! This crate provides the byte-level building blocks shared by the IBX1 crates:
//!
//! - [`BinaryReader`] - Zero-copy, bounds-checked reading from byte slices
//! - [`BinaryWriter`] - Growing output buffer with explicit byte order per write
//!
//! The IBX1 format mixes byte orders on purpose (big-endian framing integers,
//! little-endian value payloads), so every multi-byte accessor here names its
//! byte order instead of assuming one.

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;
