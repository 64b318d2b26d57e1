//! Chord simplification for chords the enumerator can't finger.
//!
//! The simplifier never invents notes. It moves notes by whole octaves and
//! drops inner voices, always keeping the bass and the top note, until the
//! chord has a chance of fitting under one hand:
//!
//! 1. re-octave notes outside the guitar's range toward its center
//! 2. collapse inner doublings of the same pitch class
//! 3. keep at most one note per string, by harmonic priority
//! 4. fold top notes down an octave when the chord is wider than a hand can span
//! 5. drop the weakest inner tone until some barre position covers the chord or
//!    only four notes are left
//!
//! Priority after bass and top: root, third, seventh, thirteenth, eleventh,
//! ninth, fifth.

pub mod harmony;

pub use harmony::*;

use tracing::debug;

use crate::domain::{Chord, NUM_FINGERS, Note, OCTAVE, Pitch};
use crate::fretboard::Guitar;

/// Revised version of `chord` that is more likely to be playable on `guitar`.
///
/// Whenever the chord has more than four notes the result differs from the
/// input; at four notes or fewer it may come back unchanged, which means the
/// simplifier has nothing left to try.
pub fn simplify_chord(chord: &Chord, guitar: &Guitar) -> Chord {
    let mut notes: Vec<Note> = chord
        .notes()
        .iter()
        .map(|n| Note {
            pitch: into_range(n.pitch, guitar),
            ..*n
        })
        .collect();
    sort_notes(&mut notes);

    let root = detect_root(&pitches(&notes));
    notes = collapse_doublings(notes);
    notes = keep_strongest(notes, root, guitar.num_strings() as usize);
    notes = fold_wide_voicing(notes, guitar);

    while notes.len() > NUM_FINGERS && !guitar.is_barreable(&pitches(&notes)) {
        if !drop_weakest(&mut notes, root) {
            break;
        }
    }

    if notes.len() > NUM_FINGERS && pitches(&notes) == chord.pitches() {
        drop_weakest(&mut notes, root);
    }

    let simplified = Chord::new(notes);
    debug!(from = %chord.id(), to = %simplified.id(), "simplified chord");
    simplified
}

fn pitches(notes: &[Note]) -> Vec<Pitch> {
    notes.iter().map(|n| n.pitch).collect()
}

fn sort_notes(notes: &mut [Note]) {
    notes.sort_by_key(|n| n.pitch);
}

/// Shift `pitch` by whole octaves until it lies inside the guitar's range.
fn into_range(pitch: Pitch, guitar: &Guitar) -> Pitch {
    let low = guitar.lowest_pitch();
    let high = guitar.highest_pitch();
    if pitch < low {
        let octaves = (pitch.interval_to(low) + OCTAVE - 1) / OCTAVE;
        return pitch.transpose(octaves * OCTAVE);
    }
    if pitch > high {
        let octaves = (high.interval_to(pitch) + OCTAVE - 1) / OCTAVE;
        return pitch.transpose(-octaves * OCTAVE);
    }
    pitch
}

/// Keep the bass, the top, and the highest inner note of each pitch class.
fn collapse_doublings(notes: Vec<Note>) -> Vec<Note> {
    let (Some(&bass), Some(&top)) = (notes.first(), notes.last()) else {
        return notes;
    };
    if notes.len() <= 2 {
        return notes;
    }

    let mut inner: Vec<Note> = Vec::new();
    for &note in notes[1..notes.len() - 1].iter().rev() {
        if !inner.iter().any(|n| n.pitch.class() == note.pitch.class()) {
            inner.push(note);
        }
    }

    let mut out = vec![bass];
    out.extend(inner.into_iter().rev());
    out.push(top);
    out
}

/// Keep-priority of the note at `idx`: bass, then top, then by harmonic degree.
fn keep_rank(notes: &[Note], idx: usize, root: Option<u8>) -> usize {
    if idx == 0 {
        return 0;
    }
    if idx + 1 == notes.len() {
        return 1;
    }
    match root {
        Some(root) => 2 + Degree::of(root, notes[idx].pitch.class()).keep_rank(),
        None => 2,
    }
}

/// No more notes than strings: keep the `limit` highest-priority notes.
fn keep_strongest(notes: Vec<Note>, root: Option<u8>, limit: usize) -> Vec<Note> {
    if notes.len() <= limit {
        return notes;
    }
    let mut ranked: Vec<usize> = (0..notes.len()).collect();
    ranked.sort_by_key(|&idx| keep_rank(&notes, idx, root));
    ranked.truncate(limit);
    ranked.sort();
    ranked.into_iter().map(|idx| notes[idx]).collect()
}

/// Bring notes that sit beyond a hand's span above the bass down by octaves.
///
/// A chord rooted on the lowest open string can ring every open string, so
/// only fretted-bass voicings are folded.
fn fold_wide_voicing(mut notes: Vec<Note>, guitar: &Guitar) -> Vec<Note> {
    let Some(bass) = notes.first().map(|n| n.pitch) else {
        return notes;
    };
    let span = guitar.max_chord_span();
    if bass == guitar.lowest_pitch() || span < OCTAVE {
        return notes;
    }

    let ceiling = bass.transpose(span);
    let mut changed = false;
    for note in notes.iter_mut().skip(1) {
        while note.pitch > ceiling {
            note.pitch = note.pitch.transpose(-OCTAVE);
            changed = true;
        }
    }
    if !changed {
        return notes;
    }

    sort_notes(&mut notes);
    notes.dedup_by_key(|n| n.pitch);
    notes
}

/// Remove the lowest-priority inner note. Returns `false` if there is none.
fn drop_weakest(notes: &mut Vec<Note>, root: Option<u8>) -> bool {
    if notes.len() <= 2 {
        return false;
    }
    let weakest = (1..notes.len() - 1).max_by_key(|&idx| (keep_rank(notes, idx, root), std::cmp::Reverse(idx)));
    match weakest {
        Some(idx) => {
            notes.remove(idx);
            true
        }
        None => false,
    }
}
