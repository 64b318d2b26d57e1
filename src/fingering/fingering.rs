//! The fingering entity and its cost model.
//!
//! A `Fingering` maps each fretting finger to the positions it holds, plus the
//! open strings that ring unfingered. It is always kept physically valid:
//! positions are only added through [`Fingering::try_add_position`], which
//! checks every playability rule before touching anything.
//!
//! Costs live in a 2-D space where one fret is 2.5 times as far as one string:
//! sliding along the neck moves the whole hand, crossing strings only moves a
//! fingertip.

use std::collections::HashMap;

use nalgebra::Vector2;

use crate::domain::{ChordId, Finger, NUM_FINGERS, Position};
use crate::fingering::ReachTable;

/// Fret-axis scale relative to the string axis.
pub const FRET_SCALE: f64 = 2.5;

/// Per-finger anchor: the first position held by each fretting finger.
pub type Anchors = [Option<Position>; NUM_FINGERS];

/// Movement modifiers per finger; `1.0` means no discount.
pub type Inactivity = [f64; NUM_FINGERS];

/// No discount for any finger.
pub const ACTIVE_HAND: Inactivity = [1.0; NUM_FINGERS];

/// Scaled Euclidean distance between two positions, divided by `modifier`.
///
/// `modifier < 1` makes the distance count for more (strain), `modifier > 1`
/// makes it count for less (ease).
pub fn distance(a: Position, b: Position, modifier: f64) -> f64 {
    let delta = Vector2::new(
        (b.fret as f64 - a.fret as f64) * FRET_SCALE,
        b.string as f64 - a.string as f64,
    );
    delta.norm() / modifier
}

/// Summed movement of every finger that is placed in both `from` and `to`.
pub fn finger_movement(from: &Anchors, to: &Anchors, inactivity: &Inactivity) -> f64 {
    from.iter()
        .zip(to.iter())
        .zip(inactivity.iter())
        .filter_map(|((a, b), &modifier)| Some(distance((*a)?, (*b)?, modifier)))
        .sum()
}

/// One entry of a fingering's transition table: the raw transition cost to a
/// fingering of a linked chord, and that fingering's index in the cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub cost: f64,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fingering {
    open: Vec<Position>,
    fingers: [Vec<Position>; NUM_FINGERS],
    stretch_cost: f64,
    chord: Option<ChordId>,
    pub(crate) to_chords: HashMap<ChordId, Vec<Candidate>>,
    pub(crate) from_chords: HashMap<ChordId, Vec<Candidate>>,
}

impl Fingering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fingering from a complete finger assignment without validating it.
    ///
    /// Use [`Fingering::is_possible`] afterwards to check the reach invariant.
    pub fn from_assignment(assignment: &[(Finger, Position)]) -> Self {
        let mut fingering = Self::new();
        for &(finger, position) in assignment {
            match finger.slot() {
                None => fingering.open.push(position),
                Some(slot) => fingering.fingers[slot].push(position),
            }
        }
        fingering.open.sort();
        for held in &mut fingering.fingers {
            held.sort();
        }
        fingering.stretch_cost = fingering.calculate_stretch();
        fingering
    }

    /// Try to place `finger` on `position`. Returns `false` and leaves the
    /// fingering untouched if the placement breaks a playability rule.
    pub fn try_add_position(&mut self, finger: Finger, position: Position, reach: &ReachTable) -> bool {
        if self.occupies_string(position.string) {
            return false;
        }

        let Some(slot) = finger.slot() else {
            if !position.is_open() {
                return false;
            }
            // An open string under a barre would be fretted by it.
            if self.barre_low_string().is_some_and(|low| position.string > low) {
                return false;
            }
            self.open.push(position);
            self.open.sort();
            return true;
        };

        if position.is_open() {
            return false;
        }

        if let Some(held) = self.fingers[slot].first() {
            if finger != Finger::Index || held.fret != position.fret {
                return false;
            }
            let lowest_barred = held.string.min(position.string);
            if self.max_open_string().is_some_and(|open| open > lowest_barred) {
                return false;
            }
        }

        let lower_neighbour = (0..slot).rev().find_map(|s| self.fingers[s].first());
        if lower_neighbour.is_some_and(|held| *held >= position) {
            return false;
        }
        let upper_neighbour = (slot + 1..NUM_FINGERS).find_map(|s| self.fingers[s].first());
        if upper_neighbour.is_some_and(|held| *held <= position) {
            return false;
        }

        for (other, held) in self.fingers.iter().enumerate() {
            if other == slot {
                continue;
            }
            if let Some(&anchor) = held.first() {
                if !reach.allows(slot, position, other, anchor) {
                    return false;
                }
            }
        }

        self.fingers[slot].push(position);
        self.fingers[slot].sort();
        self.stretch_cost = self.calculate_stretch();
        true
    }

    /// Whether every pair of placed fingers is within its maximum reach.
    pub fn is_possible(&self, reach: &ReachTable) -> bool {
        let anchors = self.anchors();
        for a in 0..NUM_FINGERS {
            for b in a + 1..NUM_FINGERS {
                if let (Some(pa), Some(pb)) = (anchors[a], anchors[b]) {
                    if !reach.allows(a, pa, b, pb) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Stretch between consecutive used fingers; skipping a finger spreads the
    /// stretch over more digits, so the distance is divided by the index gap.
    fn calculate_stretch(&self) -> f64 {
        let mut used = self
            .fingers
            .iter()
            .enumerate()
            .filter_map(|(slot, held)| held.first().map(|&p| (slot, p)));

        let Some(mut prev) = used.next() else {
            return 0.0;
        };
        let mut stretch = 0.0;
        for next in used {
            stretch += distance(prev.1, next.1, (next.0 - prev.0) as f64);
            prev = next;
        }
        stretch
    }

    /// Movement cost to `other` with every finger at full effort.
    pub fn transition(&self, other: &Fingering) -> f64 {
        self.calculate_finger_movement(other, &ACTIVE_HAND)
    }

    /// Movement cost to `other`, each finger's distance divided by its inactivity modifier.
    pub fn calculate_finger_movement(&self, other: &Fingering, inactivity: &Inactivity) -> f64 {
        finger_movement(&self.anchors(), &other.anchors(), inactivity)
    }

    pub fn stretch_cost(&self) -> f64 {
        self.stretch_cost
    }

    pub fn chord(&self) -> Option<&ChordId> {
        self.chord.as_ref()
    }

    pub fn set_chord(&mut self, chord: ChordId) {
        self.chord = Some(chord);
    }

    /// Ranked transitions to fingerings of `chord`, cheapest first.
    pub fn to_chords(&self, chord: &ChordId) -> Option<&[Candidate]> {
        self.to_chords.get(chord).map(Vec::as_slice)
    }

    /// Ranked transitions from fingerings of `chord`, cheapest first.
    pub fn from_chords(&self, chord: &ChordId) -> Option<&[Candidate]> {
        self.from_chords.get(chord).map(Vec::as_slice)
    }

    pub fn linked_to(&self) -> impl Iterator<Item = (&ChordId, usize)> {
        self.to_chords.iter().map(|(id, c)| (id, c.len()))
    }

    pub fn linked_from(&self) -> impl Iterator<Item = (&ChordId, usize)> {
        self.from_chords.iter().map(|(id, c)| (id, c.len()))
    }

    pub fn anchor(&self, finger: Finger) -> Option<Position> {
        finger.slot().and_then(|slot| self.fingers[slot].first().copied())
    }

    pub fn anchors(&self) -> Anchors {
        std::array::from_fn(|slot| self.fingers[slot].first().copied())
    }

    pub fn positions_of(&self, finger: Finger) -> &[Position] {
        match finger.slot() {
            None => &self.open,
            Some(slot) => &self.fingers[slot],
        }
    }

    /// Every held position paired with the finger holding it, open strings first.
    pub fn placements(&self) -> Vec<(Finger, Position)> {
        let mut out: Vec<(Finger, Position)> = self.open.iter().map(|&p| (Finger::Open, p)).collect();
        for finger in Finger::HAND {
            out.extend(self.positions_of(finger).iter().map(|&p| (finger, p)));
        }
        out
    }

    pub fn positions(&self) -> Vec<Position> {
        self.placements().into_iter().map(|(_, p)| p).collect()
    }

    pub fn is_barre(&self) -> bool {
        self.fingers[0].len() > 1
    }

    /// Sum of all fret numbers; lower means a lower hand position.
    pub fn fret_total(&self) -> u32 {
        self.positions().iter().map(|p| p.fret as u32).sum()
    }

    /// Fret per string (1-based string `s` at index `s - 1`), `None` if silent.
    pub fn column(&self, num_strings: u8) -> Vec<Option<u8>> {
        let mut column = vec![None; num_strings as usize];
        for position in self.positions() {
            let Some(idx) = (position.string as usize).checked_sub(1) else {
                continue;
            };
            if let Some(cell) = column.get_mut(idx) {
                *cell = Some(position.fret);
            }
        }
        column
    }

    pub fn finger_on_string(&self, string: u8) -> Option<Finger> {
        self.placements()
            .into_iter()
            .find(|(_, p)| p.string == string)
            .map(|(f, _)| f)
    }

    fn occupies_string(&self, string: u8) -> bool {
        self.open.iter().chain(self.fingers.iter().flatten()).any(|p| p.string == string)
    }

    fn barre_low_string(&self) -> Option<u8> {
        if self.is_barre() {
            self.fingers[0].iter().map(|p| p.string).min()
        } else {
            None
        }
    }

    fn max_open_string(&self) -> Option<u8> {
        self.open.iter().map(|p| p.string).max()
    }
}
