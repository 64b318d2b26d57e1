//! Layered-graph DP over the chord sequence.
//!
//! Layer `k` holds one entry per fingering of chord `k`: the cheapest way to
//! arrive there. Only that best arrival is kept, so the inactivity variant is a
//! greedy collapse of the hand state, while the fixed variant is exact.

use crate::error::AppError;
use crate::fingering::Fingering;
use crate::path::{HandState, PathStep, SongPath, inactivity_step, is_better};
use crate::store::FingeringStore;

#[derive(Debug, Clone)]
struct Arrival {
    cost: f64,
    fret_total: u32,
    hand: HandState,
}

/// Sequential DP with plain finger movement.
pub fn solve_fixed(store: &FingeringStore, steps: &[PathStep]) -> Result<SongPath, AppError> {
    let weights = store.weights();
    let Some(first) = steps.first() else {
        return Ok(SongPath::default());
    };

    let mut layer: Vec<(f64, u32)> = store
        .fingerings(&first.chord)?
        .iter()
        .map(|f| (weights.step(0.0, f.stretch_cost()), f.fret_total()))
        .collect();
    let mut back: Vec<Vec<usize>> = vec![Vec::new()];

    for window in steps.windows(2) {
        let (prev, next) = (&window[0].chord, &window[1].chord);
        let targets = store.fingerings(next)?;
        let mut next_layer = Vec::with_capacity(targets.len());
        let mut pointers = Vec::with_capacity(targets.len());

        for (t, target) in targets.iter().enumerate() {
            let mut best: Option<((f64, u32), usize)> = None;
            for candidate in store.previous_candidates(next, t, prev)? {
                let (cost, frets) = layer[candidate.index];
                let arrival = (
                    cost + weights.step(candidate.cost, target.stretch_cost()),
                    frets + target.fret_total(),
                );
                if best.is_none_or(|(b, _)| is_better(arrival, b)) {
                    best = Some((arrival, candidate.index));
                }
            }
            let (arrival, from) = best.ok_or_else(|| {
                AppError::internal(format!("No fingering of '{prev}' leads to '{next}'."))
            })?;
            next_layer.push(arrival);
            pointers.push(from);
        }

        layer = next_layer;
        back.push(pointers);
    }

    let (end, (cost, fret_total)) = best_entry(layer.iter().copied().enumerate())
        .ok_or_else(|| AppError::internal("Empty final layer in fixed DP."))?;
    Ok(SongPath {
        indices: backtrack(&back, end),
        cost,
        fret_total,
    })
}

/// Sequential DP where fingers that have rested move more cheaply.
pub fn solve_inactivity(store: &FingeringStore, steps: &[PathStep]) -> Result<SongPath, AppError> {
    let weights = store.weights();
    let Some(first) = steps.first() else {
        return Ok(SongPath::default());
    };

    let blank = HandState::blank();
    let mut layer: Vec<Arrival> = store
        .fingerings(&first.chord)?
        .iter()
        .map(|f| Arrival {
            cost: inactivity_step(weights, &blank, f),
            fret_total: f.fret_total(),
            hand: blank.after(f, first.duration),
        })
        .collect();
    let mut back: Vec<Vec<usize>> = vec![Vec::new()];

    for (k, step) in steps.iter().enumerate().skip(1) {
        let targets: &[Fingering] = store.fingerings(&step.chord)?;
        let mut next_layer = Vec::with_capacity(targets.len());
        let mut pointers = Vec::with_capacity(targets.len());

        for target in targets {
            let mut best: Option<(Arrival, usize)> = None;
            for (s, from) in layer.iter().enumerate() {
                let cost = from.cost + inactivity_step(weights, &from.hand, target);
                let fret_total = from.fret_total + target.fret_total();
                if best
                    .as_ref()
                    .is_none_or(|(b, _)| is_better((cost, fret_total), (b.cost, b.fret_total)))
                {
                    let hand = from.hand.after(target, step.duration);
                    best = Some((Arrival { cost, fret_total, hand }, s));
                }
            }
            let (arrival, from) = best.ok_or_else(|| {
                AppError::internal(format!("No fingering of chord #{} leads to '{}'.", k - 1, step.chord))
            })?;
            next_layer.push(arrival);
            pointers.push(from);
        }

        layer = next_layer;
        back.push(pointers);
    }

    let (end, (cost, fret_total)) = best_entry(layer.iter().map(|a| (a.cost, a.fret_total)).enumerate())
        .ok_or_else(|| AppError::internal("Empty final layer in inactivity DP."))?;
    Ok(SongPath {
        indices: backtrack(&back, end),
        cost,
        fret_total,
    })
}

/// Index and `(cost, fret_total)` of the best entry.
pub(crate) fn best_entry(entries: impl Iterator<Item = (usize, (f64, u32))>) -> Option<(usize, (f64, u32))> {
    let mut best: Option<(usize, (f64, u32))> = None;
    for (idx, entry) in entries {
        if best.is_none_or(|(_, b)| is_better(entry, b)) {
            best = Some((idx, entry));
        }
    }
    best
}

fn backtrack(back: &[Vec<usize>], end: usize) -> Vec<usize> {
    let mut indices = vec![end; back.len()];
    for k in (1..back.len()).rev() {
        indices[k - 1] = back[k][indices[k]];
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Position;
    use crate::fingering::distance;
    use crate::path::test_support::{random_song, song};
    use crate::path::{path_cost, solve_exhaustive};

    #[test]
    fn fixed_dp_matches_exhaustive_on_small_songs() {
        for seed in 0..40 {
            let len = 1 + (seed as usize % 3);
            let (store, steps) = random_song(seed, len, 3);
            let dp = solve_fixed(&store, &steps).unwrap();
            let brute = solve_exhaustive(&store, &steps).unwrap();
            assert!((dp.cost - brute.cost).abs() < 1e-9, "seed {seed}: {} vs {}", dp.cost, brute.cost);
            assert!((path_cost(&store, &steps, &dp.indices).unwrap() - dp.cost).abs() < 1e-9);
        }
    }

    #[test]
    fn fixed_dp_matches_exhaustive_on_longer_songs() {
        for seed in 100..110 {
            let (store, steps) = random_song(seed, 6, 4);
            let dp = solve_fixed(&store, &steps).unwrap();
            let brute = solve_exhaustive(&store, &steps).unwrap();
            assert!((dp.cost - brute.cost).abs() < 1e-9);
        }
    }

    #[test]
    fn inactivity_dp_reports_its_own_model_cost() {
        let (store, steps) = random_song(7, 12, 4);
        let path = solve_inactivity(&store, &steps).unwrap();
        assert_eq!(path.indices.len(), steps.len());

        let weights = store.weights();
        let mut hand = HandState::blank();
        let mut cost = 0.0;
        for (step, &index) in steps.iter().zip(&path.indices) {
            let f = store.fingering(&step.chord, index).unwrap();
            cost += inactivity_step(weights, &hand, f);
            hand = hand.after(f, step.duration);
        }
        assert!((cost - path.cost).abs() < 1e-9);
    }

    #[test]
    fn single_chord_takes_the_least_stretch() {
        let (store, steps) = song(&["C3 E3 G3 C4 E4"]);
        let path = solve_fixed(&store, &steps).unwrap();
        let chosen = store.fingering(&steps[0].chord, path.indices[0]).unwrap();
        let least = store
            .fingerings(&steps[0].chord)
            .unwrap()
            .iter()
            .map(Fingering::stretch_cost)
            .fold(f64::INFINITY, f64::min);
        assert!((chosen.stretch_cost() - least).abs() < 1e-12);
    }

    #[test]
    fn c_to_g_costs_less_than_refingering_from_a_blank_hand() {
        let (store, steps) = song(&["C3 E3 G3 C4 E4", "G2 B2 D3 G3 B3 G4"]);
        let from_nut = |f: &Fingering| -> f64 {
            f.anchors()
                .iter()
                .flatten()
                .map(|&p| distance(Position::new(0, p.string), p, 1.0))
                .sum()
        };

        for path in [solve_fixed(&store, &steps).unwrap(), solve_inactivity(&store, &steps).unwrap()] {
            let c = store.fingering(&steps[0].chord, path.indices[0]).unwrap();
            let g = store.fingering(&steps[1].chord, path.indices[1]).unwrap();
            assert!(c.transition(g) < from_nut(c) + from_nut(g));
        }
    }

    #[test]
    fn missing_transitions_are_internal_faults() {
        let (mut store, steps) = random_song(3, 2, 2);
        let unlinked = crate::domain::Chord::from_pitches(&[crate::domain::Pitch(90)]).id();
        store.add_chord(unlinked.clone(), store.fingerings(&steps[0].chord).unwrap().to_vec());
        let broken = vec![steps[0].clone(), PathStep::new(unlinked, 1.0)];
        let err = solve_fixed(&store, &broken).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INTERNAL);
    }
}
