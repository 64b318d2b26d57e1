//! Divide-and-conquer path solver.
//!
//! The song is split into two overlapping halves that share the middle chord,
//! each half is solved on its own (forked with `rayon::join`), and the halves
//! are stitched together. When they disagree on the shared chord, four
//! candidates are scored over the whole segment and the cheapest wins:
//!
//! - keep the right half's fingering and walk backwards through each chord's
//!   best predecessor until the chain rejoins the left half
//! - keep the left half's fingering and walk forwards through each chord's
//!   best successor until the chain rejoins the right half
//! - the left half followed by the right half's tail
//! - the left half's head followed by the right half
//!
//! Segments of one or two chords are read straight off the transition tables.

use tracing::debug;

use crate::error::AppError;
use crate::fingering::Candidate;
use crate::path::sequential::best_entry;
use crate::path::{PathStep, SongPath, is_better, path_cost, path_fret_total};
use crate::store::FingeringStore;

/// Roughly one worker per this many chords.
pub const CHORDS_PER_WORKER: usize = 20;
pub const MAX_WORKERS: usize = 8;

/// Segments shorter than this are solved without forking.
const FORK_THRESHOLD: usize = 8;

pub fn worker_count(chords: usize) -> usize {
    (chords / CHORDS_PER_WORKER).clamp(1, MAX_WORKERS)
}

pub fn solve_parallel(store: &FingeringStore, steps: &[PathStep]) -> Result<SongPath, AppError> {
    if steps.is_empty() {
        return Ok(SongPath::default());
    }

    let workers = worker_count(steps.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| AppError::internal(format!("Failed to start worker pool: {e}")))?;
    debug!(workers, chords = steps.len(), "solving segments in parallel");

    let segments = Segments { store, steps };
    let indices = pool.install(|| segments.solve(0, steps.len() - 1))?;
    Ok(SongPath {
        cost: path_cost(store, steps, &indices)?,
        fret_total: path_fret_total(store, steps, &indices)?,
        indices,
    })
}

/// Stitch solved halves `lo..=mid` and `mid..=hi` into one path for `lo..=hi`.
pub fn merge_halves(
    store: &FingeringStore,
    steps: &[PathStep],
    (lo, mid, hi): (usize, usize, usize),
    left: Vec<usize>,
    right: Vec<usize>,
) -> Result<Vec<usize>, AppError> {
    Segments { store, steps }.merge(lo, mid, hi, left, right)
}

struct Segments<'a> {
    store: &'a FingeringStore,
    steps: &'a [PathStep],
}

impl Segments<'_> {
    fn solve(&self, lo: usize, hi: usize) -> Result<Vec<usize>, AppError> {
        if hi - lo < 2 {
            return self.base(lo, hi);
        }

        let mid = lo + (hi - lo) / 2;
        let (left, right) = if hi - lo >= FORK_THRESHOLD {
            rayon::join(|| self.solve(lo, mid), || self.solve(mid, hi))
        } else {
            (self.solve(lo, mid), self.solve(mid, hi))
        };
        self.merge(lo, mid, hi, left?, right?)
    }

    fn base(&self, lo: usize, hi: usize) -> Result<Vec<usize>, AppError> {
        let weights = self.store.weights();
        let first = self.store.fingerings(&self.steps[lo].chord)?;

        if lo == hi {
            let scored = first
                .iter()
                .map(|f| (weights.step(0.0, f.stretch_cost()), f.fret_total()))
                .enumerate();
            let (best, _) = best_entry(scored)
                .ok_or_else(|| AppError::internal(format!("Chord '{}' has no fingerings.", self.steps[lo].chord)))?;
            return Ok(vec![best]);
        }

        let (from, to) = (&self.steps[lo].chord, &self.steps[hi].chord);
        let targets = self.store.fingerings(to)?;
        let mut best: Option<((f64, u32), [usize; 2])> = None;
        for (s, source) in first.iter().enumerate() {
            let head = self.best_candidate(self.store.next_candidates(from, s, to)?)?;
            let target = &targets[head.index];
            let scored = (
                weights.step(0.0, source.stretch_cost()) + weights.step(head.cost, target.stretch_cost()),
                source.fret_total() + target.fret_total(),
            );
            if best.is_none_or(|(b, _)| is_better(scored, b)) {
                best = Some((scored, [s, head.index]));
            }
        }
        best.map(|(_, pair)| pair.to_vec())
            .ok_or_else(|| AppError::internal(format!("Chord '{from}' has no fingerings.")))
    }

    fn merge(&self, lo: usize, mid: usize, hi: usize, left: Vec<usize>, right: Vec<usize>) -> Result<Vec<usize>, AppError> {
        let (Some(&left_mid), Some(&right_mid)) = (left.last(), right.first()) else {
            return Err(AppError::internal("Cannot merge an empty segment."));
        };
        if left_mid == right_mid {
            let mut path = left;
            path.extend_from_slice(&right[1..]);
            return Ok(path);
        }

        let keep_right = self.walk_back(lo, mid, &left, &right)?;
        let keep_left = self.walk_forward(mid, hi, &left, &right)?;
        let mut left_then_tail = left.clone();
        left_then_tail.extend_from_slice(&right[1..]);
        let mut head_then_right = left[..left.len() - 1].to_vec();
        head_then_right.extend_from_slice(&right);

        let segment = &self.steps[lo..=hi];
        let mut best: Option<((f64, u32), Vec<usize>)> = None;
        for option in [keep_right, keep_left, left_then_tail, head_then_right] {
            let scored = (
                path_cost(self.store, segment, &option)?,
                path_fret_total(self.store, segment, &option)?,
            );
            if best.as_ref().is_none_or(|(b, _)| is_better(scored, *b)) {
                best = Some((scored, option));
            }
        }
        best.map(|(_, path)| path)
            .ok_or_else(|| AppError::internal("Merge produced no candidate path."))
    }

    /// Right half's fingering at `mid`, then best predecessors until the left half is rejoined.
    fn walk_back(&self, lo: usize, mid: usize, left: &[usize], right: &[usize]) -> Result<Vec<usize>, AppError> {
        let mut path = left.to_vec();
        path[mid - lo] = right[0];
        let mut k = mid;
        while k > lo {
            let candidates = self.store.previous_candidates(
                &self.steps[k].chord,
                path[k - lo],
                &self.steps[k - 1].chord,
            )?;
            let prev = self.best_candidate(candidates)?.index;
            if prev == left[k - 1 - lo] {
                break;
            }
            path[k - 1 - lo] = prev;
            k -= 1;
        }
        path.extend_from_slice(&right[1..]);
        Ok(path)
    }

    /// Left half's fingering at `mid`, then best successors until the right half is rejoined.
    fn walk_forward(&self, mid: usize, hi: usize, left: &[usize], right: &[usize]) -> Result<Vec<usize>, AppError> {
        let mut tail = right.to_vec();
        tail[0] = left[left.len() - 1];
        let mut k = mid;
        while k < hi {
            let candidates = self.store.next_candidates(
                &self.steps[k].chord,
                tail[k - mid],
                &self.steps[k + 1].chord,
            )?;
            let next = self.best_candidate(candidates)?.index;
            if next == right[k + 1 - mid] {
                break;
            }
            tail[k + 1 - mid] = next;
            k += 1;
        }
        let mut path = left[..left.len() - 1].to_vec();
        path.extend(tail);
        Ok(path)
    }

    fn best_candidate(&self, candidates: &[Candidate]) -> Result<Candidate, AppError> {
        candidates
            .first()
            .copied()
            .ok_or_else(|| AppError::internal("Empty transition table."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::test_support::random_song;
    use crate::path::{solve_exhaustive, solve_fixed};

    #[test]
    fn worker_count_is_clamped() {
        assert_eq!(worker_count(0), 1);
        assert_eq!(worker_count(19), 1);
        assert_eq!(worker_count(40), 2);
        assert_eq!(worker_count(10_000), MAX_WORKERS);
    }

    #[test]
    fn merge_is_no_worse_than_naive_concatenation() {
        for seed in 0..30 {
            let len = 5 + (seed as usize % 8);
            let (store, steps) = random_song(seed, len, 4);
            let (lo, hi) = (0, len - 1);
            let mid = hi / 2;

            let left = solve_fixed(&store, &steps[lo..=mid]).unwrap().indices;
            let right = solve_fixed(&store, &steps[mid..=hi]).unwrap().indices;

            let mut left_then_tail = left.clone();
            left_then_tail.extend_from_slice(&right[1..]);
            let mut head_then_right = left[..left.len() - 1].to_vec();
            head_then_right.extend_from_slice(&right);
            let naive = path_cost(&store, &steps, &left_then_tail)
                .unwrap()
                .min(path_cost(&store, &steps, &head_then_right).unwrap());

            let merged = merge_halves(&store, &steps, (lo, mid, hi), left, right).unwrap();
            assert_eq!(merged.len(), len);
            assert!(path_cost(&store, &steps, &merged).unwrap() <= naive + 1e-9, "seed {seed}");
        }
    }

    #[test]
    fn short_songs_are_solved_exactly() {
        for seed in 0..20 {
            let len = 1 + (seed as usize % 2);
            let (store, steps) = random_song(seed, len, 4);
            let parallel = solve_parallel(&store, &steps).unwrap();
            let brute = solve_exhaustive(&store, &steps).unwrap();
            assert!((parallel.cost - brute.cost).abs() < 1e-9, "seed {seed}");
        }
    }

    #[test]
    fn never_beats_the_optimum() {
        for seed in 40..50 {
            let (store, steps) = random_song(seed, 7, 3);
            let parallel = solve_parallel(&store, &steps).unwrap();
            let dp = solve_fixed(&store, &steps).unwrap();
            assert!(parallel.cost + 1e-9 >= dp.cost);
        }
    }

    #[test]
    fn long_songs_fork_and_stay_consistent() {
        let (store, steps) = random_song(99, 120, 4);
        let path = solve_parallel(&store, &steps).unwrap();
        assert_eq!(path.indices.len(), 120);
        assert!((path_cost(&store, &steps, &path.indices).unwrap() - path.cost).abs() < 1e-9);
        for (step, &index) in steps.iter().zip(&path.indices) {
            assert!(index < store.fingerings(&step.chord).unwrap().len());
        }
    }
}
