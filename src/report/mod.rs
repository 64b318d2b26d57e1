//! Reporting utilities: formatted terminal output.
//!
//! Formatting lives here so the solvers stay free of presentation details and
//! output changes stay in one place.

pub mod format;

pub use format::*;
