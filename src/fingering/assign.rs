//! Finger assignment for a complete fretting.
//!
//! Given the positions a chord will be played on, find every way the four
//! fretting fingers can hold them. Fretted positions are taken in (fret, string)
//! order and each one is either given to the next free finger or that finger is
//! skipped and the position offered to the one after it. A branch dies as soon
//! as there are fewer fingers left than positions, or a placement breaks reach.

use crate::domain::{Finger, NUM_FINGERS, Position};
use crate::fingering::{Fingering, ReachTable};

/// Every valid finger assignment for `fretting`.
///
/// More than four fretted positions can only be held with an index-finger barre
/// across the lowest fret, and only if no open string sits under it.
pub fn assign_fingers(fretting: &[Position], reach: &ReachTable) -> Vec<Fingering> {
    let (open, mut fretted): (Vec<Position>, Vec<Position>) =
        fretting.iter().partition(|p| p.is_open());
    fretted.sort();

    let mut base = Fingering::new();
    for &position in &open {
        if !base.try_add_position(Finger::Open, position, reach) {
            return Vec::new();
        }
    }

    let Some(barre_fret) = fretted.first().map(|p| p.fret) else {
        return vec![base];
    };

    let barre: Vec<Position> = fretted.iter().filter(|p| p.fret == barre_fret).copied().collect();
    let max_open_string = open.iter().map(|p| p.string).max().unwrap_or(0);
    let lowest_barre_string = barre.iter().map(|p| p.string).min().unwrap_or(0);

    let can_barre = barre.len() > 1
        && max_open_string < lowest_barre_string
        && fretted.len() - barre.len() < NUM_FINGERS;
    let must_barre = fretted.len() > NUM_FINGERS;

    let mut out = Vec::new();
    if must_barre && !can_barre {
        return out;
    }

    if can_barre {
        let mut barred = base.clone();
        if barre.iter().all(|&p| barred.try_add_position(Finger::Index, p, reach)) {
            let rest: Vec<Position> = fretted.iter().filter(|p| p.fret != barre_fret).copied().collect();
            search(&rest, 1, barred, reach, &mut out);
        }
    }

    if !must_barre {
        search(&fretted, 0, base, reach, &mut out);
    }

    out
}

fn search(remaining: &[Position], next_slot: usize, fingering: Fingering, reach: &ReachTable, out: &mut Vec<Fingering>) {
    let Some((&position, rest)) = remaining.split_first() else {
        if fingering.is_possible(reach) {
            out.push(fingering);
        }
        return;
    };

    let free_fingers = NUM_FINGERS - next_slot;
    if free_fingers < remaining.len() {
        return;
    }

    // Assign here, or leave this finger free and try the next one.
    let choices = free_fingers - remaining.len() + 1;
    for slot in next_slot..next_slot + choices {
        let mut candidate = fingering.clone();
        if candidate.try_add_position(Finger::HAND[slot], position, reach) {
            search(rest, slot + 1, candidate, reach, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fret: u8, string: u8) -> Position {
        Position::new(fret, string)
    }

    #[test]
    fn open_only_fretting_needs_no_fingers() {
        let reach = ReachTable::standard();
        let out = assign_fingers(&[pos(0, 1), pos(0, 5), pos(0, 6)], &reach);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].stretch_cost(), 0.0);
        assert_eq!(out[0].positions_of(Finger::Open).len(), 3);
    }

    #[test]
    fn single_note_can_take_any_finger() {
        let reach = ReachTable::standard();
        let out = assign_fingers(&[pos(5, 3)], &reach);
        assert_eq!(out.len(), NUM_FINGERS);
        for f in &out {
            assert_eq!(f.stretch_cost(), 0.0);
        }
    }

    #[test]
    fn open_c_major_uses_first_three_fingers() {
        let reach = ReachTable::standard();
        let fretting = [pos(3, 2), pos(2, 3), pos(0, 4), pos(1, 5), pos(0, 6)];
        let out = assign_fingers(&fretting, &reach);
        assert!(out.iter().any(|f| {
            f.anchor(Finger::Index) == Some(pos(1, 5))
                && f.anchor(Finger::Middle) == Some(pos(2, 3))
                && f.anchor(Finger::Ring) == Some(pos(3, 2))
        }));
        for f in &out {
            assert_eq!(f.positions().len(), fretting.len());
        }
    }

    #[test]
    fn five_fretted_notes_require_a_barre() {
        let reach = ReachTable::standard();
        // F major, full barre at fret 1.
        let fretting = [pos(1, 1), pos(3, 2), pos(3, 3), pos(2, 4), pos(1, 5), pos(1, 6)];
        let out = assign_fingers(&fretting, &reach);
        assert!(!out.is_empty());
        for f in &out {
            assert!(f.is_barre());
            assert!(f.positions_of(Finger::Index).iter().all(|p| p.fret == 1));
        }
    }

    #[test]
    fn barre_over_an_open_string_is_rejected() {
        let reach = ReachTable::standard();
        // Five fretted notes, but an open string sits above the lowest barred string.
        let fretting = [pos(2, 1), pos(2, 2), pos(0, 3), pos(3, 4), pos(4, 5), pos(5, 6)];
        assert!(assign_fingers(&fretting, &reach).is_empty());
    }
}
