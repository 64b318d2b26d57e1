//! Just enough harmony to rank chord tones: root detection and generic degrees.

use crate::domain::{OCTAVE, Pitch};

/// Generic scale degree of a chord tone relative to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Degree {
    Root,
    Ninth,
    Third,
    Eleventh,
    Fifth,
    Thirteenth,
    Seventh,
}

impl Degree {
    /// Map a pitch class onto a degree above `root` (both in `0..12`).
    pub fn of(root: u8, class: u8) -> Degree {
        let interval = (class as i32 - root as i32).rem_euclid(OCTAVE);
        match interval {
            0 => Degree::Root,
            1 | 2 => Degree::Ninth,
            3 | 4 => Degree::Third,
            5 => Degree::Eleventh,
            6 | 7 => Degree::Fifth,
            8 | 9 => Degree::Thirteenth,
            _ => Degree::Seventh,
        }
    }

    /// Rank when deciding which tones to keep; lower is more important.
    pub fn keep_rank(self) -> usize {
        match self {
            Degree::Root => 0,
            Degree::Third => 1,
            Degree::Seventh => 2,
            Degree::Thirteenth => 3,
            Degree::Eleventh => 4,
            Degree::Ninth => 5,
            Degree::Fifth => 6,
        }
    }

    /// How strongly this tone above a candidate root suggests that root.
    fn evidence(self) -> u32 {
        match self {
            Degree::Root => 0,
            Degree::Third => 6,
            Degree::Fifth => 4,
            Degree::Seventh => 2,
            Degree::Ninth | Degree::Eleventh | Degree::Thirteenth => 1,
        }
    }
}

/// Most likely root pitch class of a set of pitches (given bass first).
///
/// Each distinct class is scored by the thirds, fifths and sevenths the other
/// classes form above it; ties go to the bass.
pub fn detect_root(pitches: &[Pitch]) -> Option<u8> {
    let bass = pitches.first()?.class();

    let mut classes: Vec<u8> = Vec::new();
    for p in pitches {
        if !classes.contains(&p.class()) {
            classes.push(p.class());
        }
    }

    let score = |root: u8| -> u32 {
        classes
            .iter()
            .map(|&c| Degree::of(root, c).evidence())
            .sum()
    };

    let best = classes.iter().map(|&c| score(c)).max()?;
    if score(bass) == best {
        return Some(bass);
    }
    classes.iter().copied().find(|&c| score(c) == best)
}
