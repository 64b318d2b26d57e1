//! Turning note events into the chord sequence the optimizer works on.

use crate::domain::{Chord, Note};
use crate::fretboard::Guitar;

/// Offsets closer than this belong to the same chord.
const OFFSET_EPSILON: f64 = 1e-9;

/// Chords of a song after it has been shifted into the guitar's range.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSong {
    pub chords: Vec<Chord>,
    pub transposition: i32,
}

/// Sort notes by offset (stable), transpose them to fit `guitar`, and group
/// consecutive same-offset notes into chords.
pub fn prepare_song(notes: &[Note], guitar: &Guitar) -> PreparedSong {
    let mut sorted = notes.to_vec();
    sorted.sort_by(|a, b| a.offset.total_cmp(&b.offset));

    let pitches: Vec<_> = sorted.iter().map(|n| n.pitch).collect();
    let transposition = guitar.get_transposition(&pitches);

    let mut chords = Vec::new();
    let mut current: Vec<Note> = Vec::new();
    for note in sorted {
        let note = note.transpose(transposition);
        if current
            .first()
            .is_some_and(|first| (first.offset - note.offset).abs() > OFFSET_EPSILON)
        {
            chords.push(Chord::new(std::mem::take(&mut current)));
        }
        current.push(note);
    }
    if !current.is_empty() {
        chords.push(Chord::new(current));
    }

    PreparedSong {
        chords,
        transposition,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Pitch;

    fn note(midi: i32, offset: f64) -> Note {
        Note::new(Pitch(midi), offset, 1.0)
    }

    #[test]
    fn groups_same_offset_notes() {
        let guitar = Guitar::standard(6, 15).unwrap();
        let notes = [note(48, 0.0), note(52, 0.0), note(55, 1.0), note(43, 2.0), note(47, 2.0)];
        let song = prepare_song(&notes, &guitar);
        assert_eq!(song.transposition, 0);
        let ids: Vec<String> = song.chords.iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, vec!["C3 E3", "G3", "G2 B2"]);
    }

    #[test]
    fn sorts_unordered_input_stably() {
        let guitar = Guitar::standard(6, 15).unwrap();
        let notes = [note(55, 1.0), note(48, 0.0), note(60, 1.0), note(52, 0.0)];
        let song = prepare_song(&notes, &guitar);
        assert_eq!(song.chords.len(), 2);
        assert_eq!(song.chords[0].offset(), 0.0);
        assert_eq!(song.chords[1].pitches(), vec![Pitch(55), Pitch(60)]);
    }

    #[test]
    fn transposes_low_songs_up() {
        let guitar = Guitar::standard(6, 15).unwrap();
        let notes = [note(24, 0.0), note(31, 1.0)];
        let song = prepare_song(&notes, &guitar);
        assert_eq!(song.transposition, 24);
        assert_eq!(song.chords[0].pitches(), vec![Pitch(48)]);
    }

    #[test]
    fn empty_input_gives_no_chords() {
        let guitar = Guitar::standard(6, 15).unwrap();
        let song = prepare_song(&[], &guitar);
        assert!(song.chords.is_empty());
        assert_eq!(song.transposition, 0);
    }
}
