//! Brute force over every fingering combination, scored with fixed costs.

use tracing::debug;

use crate::error::AppError;
use crate::path::{PathStep, SongPath, is_better, path_cost, path_fret_total};
use crate::store::FingeringStore;

/// Largest number of complete paths the exhaustive solver will score.
pub const MAX_EXHAUSTIVE_PATHS: u64 = 1_000_000;

pub fn solve_exhaustive(store: &FingeringStore, steps: &[PathStep]) -> Result<SongPath, AppError> {
    if steps.is_empty() {
        return Ok(SongPath::default());
    }

    let mut sizes = Vec::with_capacity(steps.len());
    let mut total: u64 = 1;
    for step in steps {
        let n = store.fingerings(&step.chord)?.len();
        if n == 0 {
            return Err(AppError::internal(format!("Chord '{}' has no fingerings.", step.chord)));
        }
        total = total.saturating_mul(n as u64);
        if total > MAX_EXHAUSTIVE_PATHS {
            return Err(AppError::config(format!(
                "Exhaustive search would score more than {MAX_EXHAUSTIVE_PATHS} paths; pick another strategy."
            )));
        }
        sizes.push(n);
    }
    debug!(paths = total, "scoring every path");

    let mut indices = vec![0usize; steps.len()];
    let mut best: Option<SongPath> = None;
    loop {
        let cost = path_cost(store, steps, &indices)?;
        let fret_total = path_fret_total(store, steps, &indices)?;
        if best
            .as_ref()
            .is_none_or(|b| is_better((cost, fret_total), (b.cost, b.fret_total)))
        {
            best = Some(SongPath {
                indices: indices.clone(),
                cost,
                fret_total,
            });
        }

        // Odometer increment, last chord fastest.
        let mut k = indices.len();
        loop {
            if k == 0 {
                return best.ok_or_else(|| AppError::internal("Exhaustive search scored no path."));
            }
            k -= 1;
            indices[k] += 1;
            if indices[k] < sizes[k] {
                break;
            }
            indices[k] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EXIT_CONFIG;
    use crate::path::test_support::{random_song, song};

    #[test]
    fn empty_song_has_empty_path() {
        let (store, _) = random_song(1, 0, 1);
        assert!(solve_exhaustive(&store, &[]).unwrap().is_empty());
    }

    #[test]
    fn refuses_songs_with_too_many_paths() {
        // Sixteen fingerings of C4, five times over.
        let (store, steps) = song(&["C4"; 5]);
        assert_eq!(store.fingerings(&steps[0].chord).unwrap().len(), 16);
        let err = solve_exhaustive(&store, &steps).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }

    #[test]
    fn finds_the_cheapest_of_every_path() {
        let (store, steps) = random_song(5, 3, 3);
        let best = solve_exhaustive(&store, &steps).unwrap();
        let sizes: Vec<usize> = steps.iter().map(|s| store.fingerings(&s.chord).unwrap().len()).collect();
        for a in 0..sizes[0] {
            for b in 0..sizes[1] {
                for c in 0..sizes[2] {
                    let cost = path_cost(&store, &steps, &[a, b, c]).unwrap();
                    assert!(best.cost <= cost + 1e-9);
                }
            }
        }
    }
}
