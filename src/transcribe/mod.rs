//! The transcription pipeline.
//!
//! notes -> chords (sorted, transposed, grouped) -> fingerings per chord
//! (simplifying when needed) -> transition tables -> song path -> `Tab`
//!
//! The fingering store is filled strictly in order here, then handed read-only
//! to the path solver.

pub mod song;

pub use song::*;

use tracing::{debug, info, warn};

use crate::domain::{Chord, CostWeights, Note, Strategy};
use crate::error::AppError;
use crate::fingering::{Enumerator, Fingering, ReachTable};
use crate::fretboard::Guitar;
use crate::path::{PathStep, find_path};
use crate::simplify::simplify_chord;
use crate::store::FingeringStore;
use crate::tab::{DEFAULT_LINE_LEN, Tab, TabEntry};

/// Narrowest tab block that still fits a label and one column.
pub const MIN_LINE_LEN: usize = 8;

/// Validated settings for a transcription run.
#[derive(Debug, Clone)]
pub struct TranscribeConfig {
    pub guitar: Guitar,
    pub weights: CostWeights,
    pub strategy: Strategy,
    pub line_len: usize,
}

impl TranscribeConfig {
    pub fn new(guitar: Guitar, weights: CostWeights, strategy: Strategy, line_len: usize) -> Result<Self, AppError> {
        if line_len < MIN_LINE_LEN {
            return Err(AppError::config(format!(
                "Tab line length must be at least {MIN_LINE_LEN} (got {line_len})."
            )));
        }
        // Weights may have been built field by field; check them again.
        let weights = CostWeights::new(weights.stretch, weights.transition)?;
        Ok(Self {
            guitar,
            weights,
            strategy,
            line_len,
        })
    }

    /// Standard six-string guitar, 15 frets, equal weights, inactivity DP.
    pub fn standard() -> Result<Self, AppError> {
        Self::new(
            Guitar::standard(6, 15)?,
            CostWeights::default(),
            Strategy::Inactivity,
            DEFAULT_LINE_LEN,
        )
    }
}

/// Everything a run produced: the tab, and the store it was chosen from.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub tab: Tab,
    pub store: FingeringStore,
    /// Chords that had to be simplified before they could be fingered.
    pub simplified: usize,
}

pub struct Transcriber {
    config: TranscribeConfig,
    reach: ReachTable,
}

impl Transcriber {
    pub fn new(config: TranscribeConfig) -> Self {
        Self {
            config,
            reach: ReachTable::standard(),
        }
    }

    pub fn config(&self) -> &TranscribeConfig {
        &self.config
    }

    /// Fingerings for one chord, simplifying it until something is playable.
    ///
    /// Returns the chord actually fingered alongside its fingerings.
    pub fn fingerings_for(&self, chord: &Chord) -> Result<(Chord, Vec<Fingering>), AppError> {
        let guitar = &self.config.guitar;
        let enumerator = Enumerator::new(guitar, &self.reach);

        let mut current = chord.clone();
        loop {
            let fingerings = enumerator.fingerings(&current);
            if !fingerings.is_empty() {
                return Ok((current, fingerings));
            }

            let simplified = simplify_chord(&current, guitar);
            if simplified.pitches() == current.pitches() {
                return Err(AppError::unplayable(format!(
                    "Chord '{}' can't be played on a {guitar} guitar with {} frets, even reduced to '{}'.",
                    chord.id(),
                    guitar.num_frets(),
                    current.id()
                )));
            }
            warn!(chord = %chord.id(), reduced = %simplified.id(), "chord unplayable as written, simplifying");
            current = simplified;
        }
    }

    /// Transcribe a song given as note events in any order.
    pub fn transcribe(&self, notes: &[Note]) -> Result<Transcription, AppError> {
        let guitar = &self.config.guitar;
        let song = prepare_song(notes, guitar);
        info!(
            notes = notes.len(),
            chords = song.chords.len(),
            transposition = song.transposition,
            "prepared song"
        );

        let mut store = FingeringStore::new(self.config.weights);
        let mut simplified = 0;
        for chord in &song.chords {
            let id = chord.id();
            if store.contains(&id) {
                continue;
            }
            let (played, fingerings) = self.fingerings_for(chord)?;
            if played.pitches() != chord.pitches() {
                simplified += 1;
            }
            // Keyed by the chord as written, whatever was actually fingered.
            store.add_chord(id, fingerings);
        }

        let steps: Vec<PathStep> = song
            .chords
            .iter()
            .map(|c| PathStep::new(c.id(), c.duration()))
            .collect();
        for pair in steps.windows(2) {
            store.add_transition(&pair[0].chord, &pair[1].chord)?;
        }
        debug!(
            chords = store.chord_count(),
            fingerings = store.fingering_count(),
            "fingering store ready"
        );

        let path = find_path(&store, &steps, self.config.strategy)?;

        let mut entries = Vec::with_capacity(steps.len());
        for ((chord, step), &index) in song.chords.iter().zip(&steps).zip(&path.indices) {
            entries.push(TabEntry {
                chord: step.chord.clone(),
                offset: chord.offset(),
                duration: step.duration,
                fingering: store.fingering(&step.chord, index)?.clone(),
            });
        }

        let tab = Tab {
            guitar: guitar.clone(),
            strategy: self.config.strategy,
            transposition: song.transposition,
            entries,
            total_cost: path.cost,
        };
        Ok(Transcription {
            tab,
            store,
            simplified,
        })
    }
}
