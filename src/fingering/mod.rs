//! Fingerings: the entity, its reach limits, and how they are generated.
//!
//! - `fingering`: the `Fingering` entity, distances and the cost model
//! - `reach`: the static per-finger-pair maximum reach table
//! - `assign`: the finger-assignment backtracking search
//! - `enumerate`: every valid fingering of a chord

pub mod assign;
pub mod enumerate;
pub mod fingering;
pub mod reach;

pub use assign::*;
pub use enumerate::*;
pub use fingering::*;
pub use reach::*;
