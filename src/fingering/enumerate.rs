//! Fingering enumerator.
//!
//! For one chord:
//! 1. walk the notes bass-first, offering each note every string/fret that sounds
//!    it inside the current hand window
//! 2. once every note has a position (a "fretting"), hand it to the finger
//!    assignment search
//!
//! The hand window starts as the whole neck, narrows to four frets either side of
//! the frets already used, and once four distinct frets are committed collapses to
//! the lowest of them on strings above any open string (only a barre can add more).

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{Chord, NUM_FINGERS, Pitch, Position};
use crate::fingering::{Fingering, ReachTable, assign_fingers};
use crate::fretboard::{Guitar, HAND_SPAN_FRETS};

/// Fret range and lowest usable string for the next note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FretWindow {
    min_fret: u8,
    max_fret: u8,
    min_string: u8,
}

impl FretWindow {
    fn admits(&self, position: Position) -> bool {
        position.string >= self.min_string
            && (position.is_open() || (self.min_fret..=self.max_fret).contains(&position.fret))
    }
}

pub struct Enumerator<'a> {
    guitar: &'a Guitar,
    reach: &'a ReachTable,
}

impl<'a> Enumerator<'a> {
    pub fn new(guitar: &'a Guitar, reach: &'a ReachTable) -> Self {
        Self { guitar, reach }
    }

    /// Every valid fingering of `chord`. Empty means the chord can't be played as written.
    pub fn fingerings(&self, chord: &Chord) -> Vec<Fingering> {
        let pitches = chord.pitches();
        let mut out = Vec::new();
        let mut fretting = Vec::with_capacity(pitches.len());
        self.expand(&pitches, &mut fretting, &mut out);
        debug!(chord = %chord.id(), fingerings = out.len(), "enumerated chord");
        out
    }

    fn expand(&self, remaining: &[Pitch], fretting: &mut Vec<Position>, out: &mut Vec<Fingering>) {
        let Some((&pitch, rest)) = remaining.split_first() else {
            out.extend(assign_fingers(fretting, self.reach));
            return;
        };

        for position in self.candidate_positions(pitch, fretting) {
            fretting.push(position);
            self.expand(rest, fretting, out);
            fretting.pop();
        }
    }

    fn candidate_positions(&self, pitch: Pitch, fretting: &[Position]) -> Vec<Position> {
        let window = self.window(fretting);
        self.guitar
            .get_pitch_locations(pitch)
            .into_iter()
            .filter(|p| !fretting.iter().any(|used| used.string == p.string))
            .filter(|p| window.admits(*p))
            .collect()
    }

    fn window(&self, fretting: &[Position]) -> FretWindow {
        let frets: BTreeSet<u8> = fretting.iter().filter(|p| !p.is_open()).map(|p| p.fret).collect();
        let num_frets = self.guitar.num_frets();

        let (Some(&lowest), Some(&highest)) = (frets.first(), frets.last()) else {
            return FretWindow {
                min_fret: 1,
                max_fret: num_frets,
                min_string: 1,
            };
        };

        if frets.len() >= NUM_FINGERS {
            let max_open_string = fretting
                .iter()
                .filter(|p| p.is_open())
                .map(|p| p.string)
                .max()
                .unwrap_or(0);
            return FretWindow {
                min_fret: lowest,
                max_fret: lowest,
                min_string: max_open_string + 1,
            };
        }

        let span = HAND_SPAN_FRETS as u8;
        FretWindow {
            min_fret: highest.saturating_sub(span).max(1),
            max_fret: lowest.saturating_add(span).min(num_frets),
            min_string: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Finger;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn chord(names: &[&str]) -> Chord {
        let pitches: Vec<Pitch> = names.iter().map(|n| n.parse().unwrap()).collect();
        Chord::from_pitches(&pitches)
    }

    fn enumerate(c: &Chord) -> Vec<Fingering> {
        let guitar = Guitar::standard(6, 15).unwrap();
        let reach = ReachTable::standard();
        Enumerator::new(&guitar, &reach).fingerings(c)
    }

    fn assert_invariants(f: &Fingering) {
        let positions = f.positions();
        let mut strings: Vec<u8> = positions.iter().map(|p| p.string).collect();
        strings.sort();
        strings.dedup();
        assert_eq!(strings.len(), positions.len(), "string used twice in {positions:?}");

        let barre = f.positions_of(Finger::Index);
        if barre.len() > 1 {
            assert!(barre.iter().all(|p| p.fret == barre[0].fret));
            let lowest_barred = barre.iter().map(|p| p.string).min().unwrap();
            assert!(f.positions_of(Finger::Open).iter().all(|p| p.string < lowest_barred));
        }

        let anchors = f.anchors();
        let placed: Vec<Position> = anchors.iter().flatten().copied().collect();
        assert!(placed.windows(2).all(|w| w[0].fret <= w[1].fret));
        assert!(f.is_possible(&ReachTable::standard()));
    }

    #[test]
    fn open_e_shape_yields_zero_fret_fingering() {
        let out = enumerate(&chord(&["E2", "B3", "E4"]));
        let open = out
            .iter()
            .find(|f| f.positions().iter().all(|p| p.fret == 0))
            .expect("all-open fingering");
        assert_eq!(open.stretch_cost(), 0.0);
        assert_eq!(open.positions().len(), 3);
    }

    #[test]
    fn single_notes_have_no_stretch() {
        for name in ["E2", "C3", "G3", "A4", "D5"] {
            let out = enumerate(&chord(&[name]));
            assert!(!out.is_empty(), "{name} should be playable");
            for f in &out {
                assert_eq!(f.stretch_cost(), 0.0);
            }
        }
    }

    #[test]
    fn open_c_major_is_found() {
        let out = enumerate(&chord(&["C3", "E3", "G3", "C4", "E4"]));
        assert!(out.iter().any(|f| f.column(6) == vec![None, Some(3), Some(2), Some(0), Some(1), Some(0)]));
        out.iter().for_each(assert_invariants);
    }

    #[test]
    fn f_major_barre_is_found() {
        let out = enumerate(&chord(&["F2", "C3", "F3", "A3", "C4", "F4"]));
        assert!(!out.is_empty());
        assert!(out.iter().all(|f| f.is_barre()));
        out.iter().for_each(assert_invariants);
    }

    #[test]
    fn impossible_cluster_has_no_fingering() {
        // Seven notes on six strings.
        let out = enumerate(&chord(&["C3", "D3", "E3", "F3", "G3", "A3", "B3"]));
        assert!(out.is_empty());
    }

    #[test]
    fn random_chords_respect_invariants() {
        let guitar = Guitar::standard(6, 15).unwrap();
        let reach = ReachTable::standard();
        let enumerator = Enumerator::new(&guitar, &reach);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..60 {
            let size = rng.gen_range(1..=6);
            let mut pool: Vec<i32> = (40..=76).collect();
            pool.shuffle(&mut rng);
            let pitches: Vec<Pitch> = pool[..size].iter().map(|&m| Pitch(m)).collect();
            for f in enumerator.fingerings(&Chord::from_pitches(&pitches)) {
                assert_invariants(&f);
                assert_eq!(f.positions().len(), size);
            }
        }
    }

    #[test]
    fn compact_chords_within_a_hand_span_are_always_playable() {
        let guitar = Guitar::standard(6, 15).unwrap();
        let reach = ReachTable::standard();
        let enumerator = Enumerator::new(&guitar, &reach);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..60 {
            // Up to four notes, each on its own string, inside a four-fret window.
            let base_fret: u8 = rng.gen_range(1..=10);
            let size = rng.gen_range(1..=4);
            let mut strings: Vec<u8> = (1..=6).collect();
            strings.shuffle(&mut rng);
            let pitches: Vec<Pitch> = strings[..size]
                .iter()
                .map(|&s| {
                    let fret = base_fret + rng.gen_range(0..4);
                    guitar.pitch_at(Position::new(fret, s)).unwrap()
                })
                .collect();
            let c = Chord::from_pitches(&pitches);
            assert!(
                !enumerator.fingerings(&c).is_empty(),
                "expected a fingering for {}",
                c.id()
            );
        }
    }
}
