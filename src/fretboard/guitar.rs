//! Instrument geometry: tuning, fret count, string count.
//!
//! Everything that maps pitches onto the neck lives here. The enumerator and
//! the simplifier only ever ask the guitar questions; they never look at the
//! tuning directly.

use std::fmt;

use crate::domain::{NUM_FINGERS, OCTAVE, Pitch, Position};
use crate::error::AppError;

/// How many frets a single hand position can cover.
pub const HAND_SPAN_FRETS: i32 = 4;

/// Largest supported string count.
pub const MAX_STRINGS: u8 = 8;

const STANDARD_TUNING: [Pitch; 6] = [Pitch(40), Pitch(45), Pitch(50), Pitch(55), Pitch(59), Pitch(64)];
const LOW_B: Pitch = Pitch(35);
const HIGH_A: Pitch = Pitch(69);

#[derive(Debug, Clone, PartialEq)]
pub struct Guitar {
    tuning: Vec<Pitch>,
    num_frets: u8,
}

impl Guitar {
    /// Build a guitar from an explicit tuning (lowest string first).
    pub fn new(tuning: Vec<Pitch>, num_frets: u8) -> Result<Self, AppError> {
        if tuning.is_empty() || tuning.len() > MAX_STRINGS as usize {
            return Err(AppError::config(format!(
                "A tuning needs between 1 and {MAX_STRINGS} strings (got {}).",
                tuning.len()
            )));
        }
        if num_frets == 0 {
            return Err(AppError::config("A guitar needs at least one fret."));
        }
        if tuning.windows(2).any(|w| w[1] < w[0]) {
            return Err(AppError::config(
                "Tuning must be listed from the lowest string to the highest.",
            ));
        }
        Ok(Self { tuning, num_frets })
    }

    /// Standard EADGBE tuning, extended with a low B (7 strings) and a high A (8 strings).
    pub fn standard(num_strings: u8, num_frets: u8) -> Result<Self, AppError> {
        let mut tuning = STANDARD_TUNING.to_vec();
        match num_strings {
            6 => {}
            7 => tuning.insert(0, LOW_B),
            8 => {
                tuning.insert(0, LOW_B);
                tuning.push(HIGH_A);
            }
            n => {
                return Err(AppError::config(format!(
                    "Standard tuning is defined for 6, 7 or 8 strings (got {n})."
                )));
            }
        }
        Self::new(tuning, num_frets)
    }

    /// Build from an optional explicit tuning, checking it against the string count.
    pub fn with_tuning(tuning: Option<Vec<Pitch>>, num_strings: u8, num_frets: u8) -> Result<Self, AppError> {
        match tuning {
            None => Self::standard(num_strings, num_frets),
            Some(tuning) => {
                if tuning.len() != num_strings as usize {
                    return Err(AppError::config(format!(
                        "Tuning lists {} strings but the guitar has {num_strings}.",
                        tuning.len()
                    )));
                }
                Self::new(tuning, num_frets)
            }
        }
    }

    pub fn tuning(&self) -> &[Pitch] {
        &self.tuning
    }

    pub fn num_frets(&self) -> u8 {
        self.num_frets
    }

    pub fn num_strings(&self) -> u8 {
        self.tuning.len() as u8
    }

    /// Open pitch of a 1-based string number.
    pub fn open_pitch(&self, string: u8) -> Option<Pitch> {
        let idx = (string as usize).checked_sub(1)?;
        self.tuning.get(idx).copied()
    }

    /// Sounding pitch of a position.
    pub fn pitch_at(&self, position: Position) -> Option<Pitch> {
        self.open_pitch(position.string)
            .map(|p| p.transpose(position.fret as i32))
    }

    pub fn lowest_pitch(&self) -> Pitch {
        self.tuning[0]
    }

    pub fn highest_pitch(&self) -> Pitch {
        self.tuning[self.tuning.len() - 1].transpose(self.num_frets as i32)
    }

    pub fn range_size(&self) -> i32 {
        self.lowest_pitch().interval_to(self.highest_pitch())
    }

    /// Widest interval one hand position can sound: the open-string span plus a hand span.
    pub fn max_chord_span(&self) -> i32 {
        self.tuning[0].interval_to(self.tuning[self.tuning.len() - 1]) + HAND_SPAN_FRETS
    }

    /// True if some fret offset leaves fewer than four notes off the "open" strings
    /// of that offset, i.e. a barre at that fret plus the free fingers can cover the chord.
    pub fn is_barreable(&self, pitches: &[Pitch]) -> bool {
        (0..self.num_frets as i32).any(|offset| {
            let unreached = pitches
                .iter()
                .filter(|p| !self.tuning.iter().any(|t| t.transpose(offset) == **p))
                .count();
            unreached < NUM_FINGERS
        })
    }

    /// Every position within `[0, num_frets]` that sounds `pitch`, lowest string first.
    pub fn get_pitch_locations(&self, pitch: Pitch) -> Vec<Position> {
        self.tuning
            .iter()
            .enumerate()
            .filter_map(|(idx, open)| {
                let fret = open.interval_to(pitch);
                (0..=self.num_frets as i32)
                    .contains(&fret)
                    .then(|| Position::new(fret as u8, idx as u8 + 1))
            })
            .collect()
    }

    /// Semitone shift that brings a song's pitches into this guitar's range.
    ///
    /// - song wider than the guitar: line the top of the song up with the top of the
    ///   guitar; the simplifier fixes the low end chord by chord
    /// - song out of range: the smallest whole-octave shift that fits
    /// - no octave fits: center the song on the guitar
    pub fn get_transposition(&self, pitches: &[Pitch]) -> i32 {
        let (Some(&song_low), Some(&song_high)) = (pitches.iter().min(), pitches.iter().max()) else {
            return 0;
        };
        let guitar_low = self.lowest_pitch();
        let guitar_high = self.highest_pitch();
        let low_overshoot = song_low.interval_to(guitar_low);
        let high_undershoot = song_high.interval_to(guitar_high);

        if song_low.interval_to(song_high) > self.range_size() {
            return high_undershoot;
        }

        if song_low < guitar_low || guitar_high < song_high {
            let octave_shift = if song_low < guitar_low {
                ceil_to_octave(low_overshoot)
            } else {
                floor_to_octave(high_undershoot)
            };
            if (low_overshoot..=high_undershoot).contains(&octave_shift) {
                return octave_shift;
            }
            return (high_undershoot + low_overshoot).div_euclid(2);
        }

        0
    }
}

fn ceil_to_octave(semitones: i32) -> i32 {
    -floor_to_octave(-semitones)
}

fn floor_to_octave(semitones: i32) -> i32 {
    semitones.div_euclid(OCTAVE) * OCTAVE
}

impl fmt::Display for Guitar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pitch in &self.tuning {
            f.write_str(pitch.name())?;
        }
        Ok(())
    }
}
