//! `tabify` library crate.
//!
//! The binary (`tabify`) is a thin wrapper around this library so that:
//!
//! - the fingering model and solvers are testable without spawning processes
//! - the pipeline can be driven from other front-ends (an editor, a server)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fingering;
pub mod fretboard;
pub mod io;
pub mod path;
pub mod report;
pub mod simplify;
pub mod store;
pub mod tab;
pub mod transcribe;
