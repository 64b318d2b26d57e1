//! Command-line parsing.
//!
//! Argument parsing and command dispatch are kept apart from the transcription
//! code; `app` turns these structs into a validated `TranscribeConfig`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Strategy;
use crate::tab::DEFAULT_LINE_LEN;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tabify", version, about = "Turn note events into playable guitar tablature")]
pub struct Cli {
    /// Log progress (repeat for more detail); `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Transcribe a CSV of note events (`pitch,offset,duration`) into tablature.
    Transcribe(TranscribeArgs),
    /// List every fingering of a single chord, e.g. `tabify chord "C3 E3 G3"`.
    Chord(ChordArgs),
}

/// Instrument and cost settings shared by every command.
#[derive(Debug, Args, Clone)]
pub struct GuitarArgs {
    /// Tuning, lowest string first (e.g. "D2 A2 D3 G3 B3 E4"). Defaults to standard.
    #[arg(long, env = "TABIFY_TUNING")]
    pub tuning: Option<String>,

    /// Number of strings (6, 7 or 8 for standard tuning).
    #[arg(long, env = "TABIFY_STRINGS", default_value_t = 6)]
    pub strings: u8,

    /// Number of frets.
    #[arg(long, env = "TABIFY_FRETS", default_value_t = 15)]
    pub frets: u8,

    /// Weight of stretch cost in the objective.
    #[arg(long, env = "TABIFY_STRETCH_WEIGHT", default_value_t = 0.5)]
    pub stretch_weight: f64,

    /// Weight of transition cost in the objective.
    #[arg(long, env = "TABIFY_TRANSITION_WEIGHT", default_value_t = 0.5)]
    pub transition_weight: f64,
}

#[derive(Debug, Args, Clone)]
pub struct TranscribeArgs {
    /// CSV file of note events.
    #[arg(short = 'f', long = "file", value_name = "CSV")]
    pub file: PathBuf,

    #[command(flatten)]
    pub guitar: GuitarArgs,

    /// Path optimizer.
    #[arg(long, value_enum, env = "TABIFY_STRATEGY", default_value_t = Strategy::Inactivity)]
    pub strategy: Strategy,

    /// Wrap tab blocks at this many columns.
    #[arg(long, default_value_t = DEFAULT_LINE_LEN)]
    pub width: usize,

    /// Print the finger diagram of every chord after the tab.
    #[arg(long)]
    pub diagrams: bool,

    /// Export the tab to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Write a markdown dump of the fingering store under `debug/`.
    #[arg(long)]
    pub debug_store: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ChordArgs {
    /// Pitches of the chord, e.g. "C3 E3 G3".
    pub pitches: String,

    #[command(flatten)]
    pub guitar: GuitarArgs,
}
