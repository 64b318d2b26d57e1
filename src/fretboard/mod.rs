//! Fretboard model.
//!
//! A `Guitar` answers pitch/position questions: which positions sound a pitch,
//! how wide the instrument's range is, and how a song should be transposed.

pub mod guitar;

pub use guitar::*;
