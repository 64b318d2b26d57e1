//! Static maximum-reach table between pairs of fretting fingers.
//!
//! The table is built once per run and passed by reference into the enumerator
//! and the finger-assignment search. Each entry is the distance (in the same
//! scaled space as [`distance`]) between the lowest string at fret 0 and the
//! highest string at the pair's fret span, i.e. the widest stretch that pair of
//! fingers can hold across the whole neck.

use crate::domain::{NUM_FINGERS, Position};
use crate::fingering::distance;

/// Fret span each finger pair can cover (index, middle, ring, pinky).
const STANDARD_FRET_SPANS: [[u8; NUM_FINGERS]; NUM_FINGERS] = [
    [0, 3, 4, 5],
    [3, 0, 2, 4],
    [4, 2, 0, 2],
    [5, 4, 2, 0],
];

/// String span the table is measured across.
const REFERENCE_STRING_SPAN: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ReachTable {
    max: [[f64; NUM_FINGERS]; NUM_FINGERS],
}

impl ReachTable {
    pub fn standard() -> Self {
        Self::from_fret_spans(STANDARD_FRET_SPANS)
    }

    pub fn from_fret_spans(spans: [[u8; NUM_FINGERS]; NUM_FINGERS]) -> Self {
        let mut max = [[0.0; NUM_FINGERS]; NUM_FINGERS];
        for (a, row) in spans.iter().enumerate() {
            for (b, &frets) in row.iter().enumerate() {
                max[a][b] = distance(
                    Position::new(0, 1),
                    Position::new(frets, 1 + REFERENCE_STRING_SPAN),
                    1.0,
                );
            }
        }
        Self { max }
    }

    /// Maximum distance between two finger slots (0 = index .. 3 = pinky).
    pub fn max_reach(&self, a: usize, b: usize) -> f64 {
        self.max[a][b]
    }

    /// Whether fingers in slots `a` and `b` can hold `pa` and `pb` at once.
    pub fn allows(&self, a: usize, pa: Position, b: usize, pb: Position) -> bool {
        distance(pa, pb, 1.0) <= self.max[a][b] + 1e-9
    }
}

impl Default for ReachTable {
    fn default() -> Self {
        Self::standard()
    }
}
