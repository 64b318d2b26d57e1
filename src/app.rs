//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - builds a validated `TranscribeConfig`
//! - runs the transcription pipeline and prints the tab
//! - writes optional exports

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{ChordArgs, Command, GuitarArgs, TranscribeArgs};
use crate::domain::{Chord, CostWeights, Strategy, parse_pitch_list};
use crate::error::AppError;
use crate::fretboard::Guitar;
use crate::tab::DEFAULT_LINE_LEN;
use crate::transcribe::{TranscribeConfig, Transcriber};

pub mod pipeline;

/// Entry point for the `tabify` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Transcribe(args) => handle_transcribe(args),
        Command::Chord(args) => handle_chord(args),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "tabify=info",
        2 => "tabify=debug",
        _ => "tabify=trace",
    };
    // A subscriber may already be installed (tests); that one wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_transcribe(args: TranscribeArgs) -> Result<(), AppError> {
    let config = transcribe_config_from_args(&args.guitar, args.strategy, args.width)?;
    let output = pipeline::run_file(&args.file, &config)?;

    println!("{}", crate::report::format_run_summary(&output.run, &config));
    print!("{}", crate::tab::render_tab(&output.run.tab, config.line_len));

    if args.diagrams {
        for entry in &output.run.tab.entries {
            println!("\n{} @ {}", entry.chord, entry.offset);
            print!("{}", crate::tab::finger_diagram(&entry.fingering));
        }
    }

    if let Some(path) = &args.export {
        crate::io::export::write_tab_json(path, &output.run.tab)?;
        info!(path = %path.display(), "exported tab");
    }
    if args.debug_store {
        let path = crate::debug::write_store_dump(Path::new("debug"), &output.run.store, &config)?;
        eprintln!("Wrote store dump to {}", path.display());
    }

    Ok(())
}

fn handle_chord(args: ChordArgs) -> Result<(), AppError> {
    let config = transcribe_config_from_args(&args.guitar, Strategy::Inactivity, DEFAULT_LINE_LEN)?;
    let pitches = parse_pitch_list(&args.pitches)?;
    if pitches.is_empty() {
        return Err(AppError::config("A chord needs at least one pitch."));
    }
    let chord = Chord::from_pitches(&pitches);

    let transcriber = Transcriber::new(config);
    let (played, fingerings) = transcriber.fingerings_for(&chord)?;
    print!(
        "{}",
        crate::report::format_chord_fingerings(&chord, &played, &fingerings, &transcriber.config().guitar)
    );
    Ok(())
}

/// Build and validate the run configuration from parsed arguments.
pub fn transcribe_config_from_args(
    guitar: &GuitarArgs,
    strategy: Strategy,
    line_len: usize,
) -> Result<TranscribeConfig, AppError> {
    let tuning = guitar.tuning.as_deref().map(parse_pitch_list).transpose()?;
    let instrument = Guitar::with_tuning(tuning, guitar.strings, guitar.frets)?;
    let weights = CostWeights::new(guitar.stretch_weight, guitar.transition_weight)?;
    TranscribeConfig::new(instrument, weights, strategy, line_len)
}
