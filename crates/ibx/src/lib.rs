//! IBX1 - binary tree format conversion library.
//!
//! This crate provides a unified interface to the IBX1 crates and a batch
//! driver that converts single files or whole directory trees.
//!
//! # Crates
//!
//! - [`ibx_common`] - Byte-level reading and writing
//! - [`ibx_format`] - IBX1 codec, element tree and XML bridge
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ibx::prelude::*;
//!
//! let converter = Converter::decoder(RenderOptions::default());
//! let jobs = plan(Path::new("data"), Path::new("xml"), Direction::Decode)?;
//!
//! let report = converter.run_all(&jobs, false, |job, result| {
//!     println!("{} ... {}", job.input.display(), if result.is_ok() { "OK" } else { "FAILED" });
//! });
//! println!("{} converted, {} failed", report.converted, report.failed.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
mod error;

// Re-export sub-crates
pub use ibx_common as common;
pub use ibx_format as format;

pub use error::{Error, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::batch::{plan, BatchReport, Converter, Direction, Job, Outcome};
    pub use ibx_format::{
        BuildOptions, Decoded, Document, Element, PropertyEntry, RenderOptions, TypedValue,
        ValueKind,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
