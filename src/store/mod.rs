//! Transition cache.
//!
//! Holds every fingering of every chord seen in a run, and for each adjacent
//! chord pair the ranked transition tables stored on the fingerings themselves.
//! Populated sequentially; the path solvers only read it.

pub mod cache;

pub use cache::*;
