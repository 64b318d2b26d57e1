//! Input/output helpers.
//!
//! - CSV ingest of note events (`ingest`)
//! - tab JSON read/write (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
