//! Shared domain types.
//!
//! These types are kept small and `Copy` where possible so the enumerator and
//! the path search can pass them around freely:
//!
//! - pitches and notes as handed over by the score reader
//! - chords and their structural identity (`ChordId`)
//! - fretboard positions and fingers
//! - cost weights and search strategy selection

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Semitones per octave.
pub const OCTAVE: i32 = 12;

/// Valid MIDI note numbers.
pub const MIDI_RANGE: std::ops::RangeInclusive<i32> = 0..=127;

/// Number of fretting fingers (index through pinky).
pub const NUM_FINGERS: usize = 4;

const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// A pitch as a MIDI note number (`C4 = 60`, `E2 = 40`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pitch(pub i32);

impl Pitch {
    /// `None` unless `midi` is a valid MIDI note number.
    pub fn checked(midi: i32) -> Option<Pitch> {
        MIDI_RANGE.contains(&midi).then_some(Pitch(midi))
    }

    pub fn midi(self) -> i32 {
        self.0
    }

    /// Pitch class in `0..12` (`C = 0`).
    pub fn class(self) -> u8 {
        self.0.rem_euclid(OCTAVE) as u8
    }

    /// Scientific-pitch octave (`C4` is middle C).
    pub fn octave(self) -> i32 {
        self.0.div_euclid(OCTAVE) - 1
    }

    pub fn transpose(self, semitones: i32) -> Pitch {
        Pitch(self.0 + semitones)
    }

    /// Signed semitone distance from `self` up to `other`.
    pub fn interval_to(self, other: Pitch) -> i32 {
        other.0 - self.0
    }

    /// Pitch-class name without octave, spelled with sharps.
    pub fn name(self) -> &'static str {
        SHARP_NAMES[self.class() as usize]
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave())
    }
}

impl FromStr for Pitch {
    type Err = AppError;

    /// Accepts scientific names (`E2`, `F#3`, `Bb3`, `c4`) or a raw MIDI number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(midi) = s.parse::<i32>() {
            return Pitch::checked(midi).ok_or_else(|| out_of_range(s));
        }

        let mut chars = s.chars();
        let letter = chars
            .next()
            .ok_or_else(|| AppError::config("Empty pitch name."))?;
        let mut class: i32 = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(AppError::config(format!("Invalid pitch name '{s}'."))),
        };

        let rest = chars.as_str();
        let octave_start = rest
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| AppError::config(format!("Pitch '{s}' is missing an octave.")))?;
        for accidental in rest[..octave_start].chars() {
            match accidental {
                '#' => class += 1,
                'b' => class -= 1,
                _ => return Err(AppError::config(format!("Invalid accidental in pitch '{s}'."))),
            }
        }
        let octave: i32 = rest[octave_start..]
            .parse()
            .map_err(|_| AppError::config(format!("Invalid octave in pitch '{s}'.")))?;

        octave
            .checked_add(1)
            .and_then(|o| o.checked_mul(OCTAVE))
            .and_then(|base| base.checked_add(class))
            .and_then(Pitch::checked)
            .ok_or_else(|| out_of_range(s))
    }
}

fn out_of_range(s: &str) -> AppError {
    AppError::config(format!("Pitch '{s}' is outside the MIDI range 0..=127."))
}

/// Parse a whitespace-separated list of pitches (`"E2 A2 D3"`).
pub fn parse_pitch_list(s: &str) -> Result<Vec<Pitch>, AppError> {
    s.split_whitespace().map(str::parse).collect()
}

/// A single note event as produced by the score reader.
///
/// `offset` and `duration` are in quarter notes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    pub offset: f64,
    pub duration: f64,
}

impl Note {
    pub fn new(pitch: Pitch, offset: f64, duration: f64) -> Self {
        Self {
            pitch,
            offset,
            duration,
        }
    }

    pub fn transpose(self, semitones: i32) -> Note {
        Note {
            pitch: self.pitch.transpose(semitones),
            ..self
        }
    }
}

/// Structural identity of a chord: its sorted pitches, e.g. `"C3 E3 G3"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChordId(String);

impl ChordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Notes sounding together at one offset, kept sorted by pitch (bass first).
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    notes: Vec<Note>,
}

impl Chord {
    pub fn new(mut notes: Vec<Note>) -> Self {
        notes.sort_by_key(|n| n.pitch);
        Self { notes }
    }

    /// Build a chord of unit-length notes at offset zero.
    pub fn from_pitches(pitches: &[Pitch]) -> Self {
        Self::new(pitches.iter().map(|&p| Note::new(p, 0.0, 1.0)).collect())
    }

    pub fn id(&self) -> ChordId {
        let names: Vec<String> = self.notes.iter().map(|n| n.pitch.to_string()).collect();
        ChordId(names.join(" "))
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn pitches(&self) -> Vec<Pitch> {
        self.notes.iter().map(|n| n.pitch).collect()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn offset(&self) -> f64 {
        self.notes.first().map(|n| n.offset).unwrap_or(0.0)
    }

    /// Shortest note duration; this is how long the hand holds the shape.
    pub fn duration(&self) -> f64 {
        self.notes
            .iter()
            .map(|n| n.duration)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    pub fn bass(&self) -> Option<Note> {
        self.notes.first().copied()
    }

    pub fn top(&self) -> Option<Note> {
        self.notes.last().copied()
    }
}

/// A fretboard coordinate. String 1 is the lowest-pitched string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub fret: u8,
    pub string: u8,
}

impl Position {
    pub fn new(fret: u8, string: u8) -> Self {
        Self { fret, string }
    }

    pub fn is_open(self) -> bool {
        self.fret == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.fret, self.string)
    }
}

/// A fretting finger, or the sentinel for open (unfingered) strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Open,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// Fretting fingers in index order.
    pub const HAND: [Finger; NUM_FINGERS] =
        [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// `1` (index) through `4` (pinky); `None` for the open sentinel.
    pub fn number(self) -> Option<usize> {
        match self {
            Finger::Open => None,
            Finger::Index => Some(1),
            Finger::Middle => Some(2),
            Finger::Ring => Some(3),
            Finger::Pinky => Some(4),
        }
    }

    /// Zero-based slot for per-finger arrays.
    pub fn slot(self) -> Option<usize> {
        self.number().map(|n| n - 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            Finger::Open => "O",
            Finger::Index => "1",
            Finger::Middle => "2",
            Finger::Ring => "3",
            Finger::Pinky => "4",
        }
    }
}

/// Relative weights of stretch and transition effort in the path objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    pub stretch: f64,
    pub transition: f64,
}

impl CostWeights {
    /// Validate that both weights are non-negative and sum to 1.
    pub fn new(stretch: f64, transition: f64) -> Result<Self, AppError> {
        if !(stretch.is_finite() && transition.is_finite()) || stretch < 0.0 || transition < 0.0 {
            return Err(AppError::config(format!(
                "Cost weights must be finite and non-negative (stretch={stretch}, transition={transition})."
            )));
        }
        if ((stretch + transition) - 1.0).abs() > 1e-9 {
            return Err(AppError::config(format!(
                "Cost weights must add up to 1 (stretch={stretch} + transition={transition})."
            )));
        }
        Ok(Self {
            stretch,
            transition,
        })
    }

    /// Weighted cost of one step: moving into a fingering and holding it.
    pub fn step(&self, transition: f64, stretch: f64) -> f64 {
        self.transition * transition + self.stretch * stretch
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            stretch: 0.5,
            transition: 0.5,
        }
    }
}

/// Which path optimizer to run over the chord sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Sequential DP that discounts movement of fingers that have been idle.
    Inactivity,
    /// Sequential DP with plain finger movement.
    Fixed,
    /// Divide-and-conquer over segments, solved on a rayon pool.
    Parallel,
    /// Every path, for small songs only.
    Exhaustive,
}

impl Strategy {
    pub fn display_name(self) -> &'static str {
        match self {
            Strategy::Inactivity => "inactivity-aware DP",
            Strategy::Fixed => "fixed-weight DP",
            Strategy::Parallel => "parallel divide-and-conquer",
            Strategy::Exhaustive => "exhaustive search",
        }
    }
}
