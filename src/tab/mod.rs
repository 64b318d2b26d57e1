//! The finished transcription: one fingering per chord, and the ways of showing it.
//!
//! - `render`: ASCII tablature, highest string on top, wrapped into blocks
//! - `diagram`: which finger holds what, for a single fingering

pub mod diagram;
pub mod render;

pub use diagram::*;
pub use render::*;

use crate::domain::{ChordId, Strategy};
use crate::fingering::Fingering;
use crate::fretboard::Guitar;

/// One column of the tab.
#[derive(Debug, Clone)]
pub struct TabEntry {
    pub chord: ChordId,
    pub offset: f64,
    pub duration: f64,
    pub fingering: Fingering,
}

#[derive(Debug, Clone)]
pub struct Tab {
    pub guitar: Guitar,
    pub strategy: Strategy,
    /// Semitones the song was shifted by to fit the guitar.
    pub transposition: i32,
    pub entries: Vec<TabEntry>,
    pub total_cost: f64,
}

impl Tab {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fingerings(&self) -> impl Iterator<Item = &Fingering> {
        self.entries.iter().map(|e| &e.fingering)
    }

    /// Fret per string for every entry (see [`Fingering::column`]).
    pub fn columns(&self) -> Vec<Vec<Option<u8>>> {
        let strings = self.guitar.num_strings();
        self.fingerings().map(|f| f.column(strings)).collect()
    }
}
