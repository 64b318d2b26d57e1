//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - pitches, notes and chords (`Pitch`, `Note`, `Chord`, `ChordId`)
//! - fretboard coordinates and fingers (`Position`, `Finger`)
//! - optimizer settings (`CostWeights`, `Strategy`)

pub mod types;

pub use types::*;
