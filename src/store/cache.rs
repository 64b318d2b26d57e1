use std::collections::HashMap;

use tracing::{debug, trace};

use crate::domain::{ChordId, CostWeights};
use crate::error::AppError;
use crate::fingering::{Candidate, Fingering};

#[derive(Debug, Clone, Default)]
pub struct FingeringStore {
    weights: CostWeights,
    chords: HashMap<ChordId, Vec<Fingering>>,
}

impl FingeringStore {
    /// `weights` decide how candidates are ranked in the transition tables.
    pub fn new(weights: CostWeights) -> Self {
        Self {
            weights,
            chords: HashMap::new(),
        }
    }

    pub fn weights(&self) -> CostWeights {
        self.weights
    }

    pub fn contains(&self, chord: &ChordId) -> bool {
        self.chords.contains_key(chord)
    }

    /// Register the fingerings of `chord`. A chord that is already registered is left as is.
    pub fn add_chord(&mut self, chord: ChordId, mut fingerings: Vec<Fingering>) {
        if self.chords.contains_key(&chord) {
            return;
        }
        for fingering in &mut fingerings {
            fingering.set_chord(chord.clone());
        }
        debug!(chord = %chord, fingerings = fingerings.len(), "registered chord");
        self.chords.insert(chord, fingerings);
    }

    pub fn fingerings(&self, chord: &ChordId) -> Result<&[Fingering], AppError> {
        self.chords
            .get(chord)
            .map(Vec::as_slice)
            .ok_or_else(|| AppError::internal(format!("Chord '{chord}' is not in the fingering store.")))
    }

    pub fn fingering(&self, chord: &ChordId, index: usize) -> Result<&Fingering, AppError> {
        self.fingerings(chord)?.get(index).ok_or_else(|| {
            AppError::internal(format!("Chord '{chord}' has no fingering #{index}."))
        })
    }

    pub fn chord_count(&self) -> usize {
        self.chords.len()
    }

    pub fn fingering_count(&self) -> usize {
        self.chords.values().map(Vec::len).sum()
    }

    /// Registered chords in a stable (sorted) order.
    pub fn chord_ids(&self) -> Vec<&ChordId> {
        let mut ids: Vec<&ChordId> = self.chords.keys().collect();
        ids.sort();
        ids
    }

    /// Whether the transition tables between `from` and `to` exist.
    pub fn has_transition(&self, from: &ChordId, to: &ChordId) -> bool {
        self.chords
            .get(from)
            .and_then(|fs| fs.first())
            .is_some_and(|f| f.to_chords(to).is_some())
    }

    /// Build the ranked transition tables between two registered chords.
    ///
    /// Every fingering of `from` gets a `to_chords[to]` list and every fingering
    /// of `to` a `from_chords[from]` list, each sorted by weighted transition plus
    /// the candidate's stretch. Calling it again for the same pair is a no-op.
    pub fn add_transition(&mut self, from: &ChordId, to: &ChordId) -> Result<(), AppError> {
        let sources = self.fingerings(from)?;
        let targets = self.fingerings(to)?;
        if sources.is_empty() || targets.is_empty() || self.has_transition(from, to) {
            return Ok(());
        }

        let weights = self.weights;
        let costs: Vec<Vec<f64>> = sources
            .iter()
            .map(|s| targets.iter().map(|t| s.transition(t)).collect())
            .collect();

        let outgoing: Vec<Vec<Candidate>> = costs
            .iter()
            .map(|row| ranked(row.iter().copied().enumerate(), targets, weights))
            .collect();
        let incoming: Vec<Vec<Candidate>> = (0..targets.len())
            .map(|t| ranked(costs.iter().map(|row| row[t]).enumerate(), sources, weights))
            .collect();

        trace!(from = %from, to = %to, pairs = sources.len() * targets.len(), "computed transitions");

        if let Some(fs) = self.chords.get_mut(from) {
            for (fingering, table) in fs.iter_mut().zip(outgoing) {
                fingering.to_chords.insert(to.clone(), table);
            }
        }
        if let Some(fs) = self.chords.get_mut(to) {
            for (fingering, table) in fs.iter_mut().zip(incoming) {
                fingering.from_chords.insert(from.clone(), table);
            }
        }
        Ok(())
    }

    /// Ranked transitions from fingering `index` of `from` into chord `to`.
    pub fn next_candidates(&self, from: &ChordId, index: usize, to: &ChordId) -> Result<&[Candidate], AppError> {
        self.fingering(from, index)?.to_chords(to).ok_or_else(|| {
            AppError::internal(format!("No transitions computed from '{from}' to '{to}'."))
        })
    }

    /// Ranked transitions into fingering `index` of `to` from chord `from`.
    pub fn previous_candidates(&self, to: &ChordId, index: usize, from: &ChordId) -> Result<&[Candidate], AppError> {
        self.fingering(to, index)?.from_chords(from).ok_or_else(|| {
            AppError::internal(format!("No transitions computed from '{from}' to '{to}'."))
        })
    }
}

/// Sort `(index, raw transition)` pairs by the weighted step cost into `candidates[index]`.
fn ranked(
    costs: impl Iterator<Item = (usize, f64)>,
    candidates: &[Fingering],
    weights: CostWeights,
) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = costs.map(|(index, cost)| Candidate { cost, index }).collect();
    out.sort_by(|a, b| {
        let ka = weights.step(a.cost, candidates[a.index].stretch_cost());
        let kb = weights.step(b.cost, candidates[b.index].stretch_cost());
        ka.total_cmp(&kb)
            .then_with(|| candidates[a.index].fret_total().cmp(&candidates[b.index].fret_total()))
            .then_with(|| a.index.cmp(&b.index))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chord, Finger, Position, parse_pitch_list};
    use crate::fingering::{Enumerator, ReachTable};
    use crate::fretboard::Guitar;

    fn pos(fret: u8, string: u8) -> Position {
        Position::new(fret, string)
    }

    fn id(s: &str) -> ChordId {
        Chord::from_pitches(&parse_pitch_list(s).unwrap()).id()
    }

    fn two_chord_store() -> (FingeringStore, ChordId, ChordId) {
        let mut store = FingeringStore::new(CostWeights::default());
        let a = id("C3");
        let b = id("D3");
        store.add_chord(
            a.clone(),
            vec![
                Fingering::from_assignment(&[(Finger::Index, pos(3, 2))]),
                Fingering::from_assignment(&[(Finger::Index, pos(8, 1))]),
            ],
        );
        store.add_chord(
            b.clone(),
            vec![
                Fingering::from_assignment(&[(Finger::Index, pos(10, 1))]),
                Fingering::from_assignment(&[(Finger::Index, pos(5, 2))]),
                Fingering::from_assignment(&[(Finger::Open, pos(0, 3))]),
            ],
        );
        (store, a, b)
    }

    #[test]
    fn add_chord_is_idempotent_and_tags_fingerings() {
        let (mut store, a, _) = two_chord_store();
        store.add_chord(a.clone(), Vec::new());
        assert_eq!(store.fingerings(&a).unwrap().len(), 2);
        assert!(store.fingerings(&a).unwrap().iter().all(|f| f.chord() == Some(&a)));
        assert_eq!(store.chord_count(), 2);
        assert_eq!(store.fingering_count(), 5);
    }

    #[test]
    fn transition_tables_are_sorted_and_complete() {
        let (mut store, a, b) = two_chord_store();
        store.add_transition(&a, &b).unwrap();

        for (i, f) in store.fingerings(&a).unwrap().iter().enumerate() {
            let table = store.next_candidates(&a, i, &b).unwrap();
            assert_eq!(table.len(), 3);
            let targets = store.fingerings(&b).unwrap();
            let keys: Vec<f64> = table
                .iter()
                .map(|c| c.cost + targets[c.index].stretch_cost())
                .collect();
            assert!(keys.windows(2).all(|w| w[0] <= w[1]));
            for c in table {
                assert!((c.cost - f.transition(&targets[c.index])).abs() < 1e-12);
            }
        }
        for i in 0..3 {
            assert_eq!(store.previous_candidates(&b, i, &a).unwrap().len(), 2);
        }

        // Open strings are free; of the fretted targets fret 5 on string 2 is closest.
        let table = store.next_candidates(&a, 0, &b).unwrap();
        assert_eq!(table[0].index, 2);
        assert_eq!(table[1].index, 1);
    }

    #[test]
    fn open_strings_cost_nothing_to_reach() {
        let (mut store, a, b) = two_chord_store();
        store.add_transition(&a, &b).unwrap();
        let best = store.next_candidates(&a, 1, &b).unwrap()[0];
        assert_eq!(best.index, 2);
        assert_eq!(best.cost, 0.0);
    }

    #[test]
    fn repeated_transition_is_a_no_op() {
        let (mut store, a, b) = two_chord_store();
        store.add_transition(&a, &b).unwrap();
        let before = store.next_candidates(&a, 0, &b).unwrap().to_vec();
        store.add_transition(&a, &b).unwrap();
        assert_eq!(store.next_candidates(&a, 0, &b).unwrap(), before.as_slice());
        assert!(store.has_transition(&a, &b));
        assert!(!store.has_transition(&b, &a));
    }

    #[test]
    fn unknown_chord_is_an_internal_fault() {
        let (mut store, a, _) = two_chord_store();
        let err = store.add_transition(&a, &id("E5")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INTERNAL);
        assert!(store.next_candidates(&a, 0, &id("E5")).is_err());
    }

    #[test]
    fn self_transition_between_identical_chords() {
        let guitar = Guitar::standard(6, 15).unwrap();
        let reach = ReachTable::standard();
        let chord = Chord::from_pitches(&parse_pitch_list("C3 E3 G3").unwrap());
        let mut store = FingeringStore::new(CostWeights::default());
        store.add_chord(chord.id(), Enumerator::new(&guitar, &reach).fingerings(&chord));
        store.add_transition(&chord.id(), &chord.id()).unwrap();

        let n = store.fingerings(&chord.id()).unwrap().len();
        for i in 0..n {
            let to = store.next_candidates(&chord.id(), i, &chord.id()).unwrap();
            let from = store.previous_candidates(&chord.id(), i, &chord.id()).unwrap();
            assert_eq!(to.len(), n);
            assert_eq!(from.len(), n);
        }
    }
}
