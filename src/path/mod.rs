//! Song path optimizers.
//!
//! Every solver picks one fingering per chord (an index into the store's list
//! for that chord) so the whole song is as cheap to play as possible:
//!
//! - `sequential`: layered DP, with or without finger inactivity
//! - `parallel`: divide and conquer over overlapping segments on a rayon pool
//! - `exhaustive`: every path; the reference the others are tested against
//!
//! The store must hold every chord and every adjacent transition before a
//! solver runs.

pub mod cost;
pub mod exhaustive;
pub mod parallel;
pub mod sequential;

pub use cost::*;
pub use exhaustive::*;
pub use parallel::*;
pub use sequential::*;

use tracing::info;

use crate::domain::{ChordId, Strategy};
use crate::error::AppError;
use crate::store::FingeringStore;

/// One chord of the song as the solvers see it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    pub chord: ChordId,
    /// How long the shape is held, in quarter notes.
    pub duration: f64,
}

impl PathStep {
    pub fn new(chord: ChordId, duration: f64) -> Self {
        Self { chord, duration }
    }
}

/// The chosen fingering per step and what it costs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SongPath {
    pub indices: Vec<usize>,
    pub cost: f64,
    pub fret_total: u32,
}

impl SongPath {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Run `strategy` over `steps`.
pub fn find_path(store: &FingeringStore, steps: &[PathStep], strategy: Strategy) -> Result<SongPath, AppError> {
    if steps.is_empty() {
        return Ok(SongPath::default());
    }

    let path = match strategy {
        Strategy::Inactivity => solve_inactivity(store, steps)?,
        Strategy::Fixed => solve_fixed(store, steps)?,
        Strategy::Parallel => solve_parallel(store, steps)?,
        Strategy::Exhaustive => solve_exhaustive(store, steps)?,
    };

    info!(
        strategy = strategy.display_name(),
        chords = steps.len(),
        cost = path.cost,
        "found song path"
    );
    Ok(path)
}
