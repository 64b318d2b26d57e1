//! Shared "file to tab" pipeline.
//!
//! read CSV -> transcribe -> `RunOutput`
//!
//! The binary and the integration tests both go through here, so they exercise
//! the same path from a file on disk to a finished tab.

use std::path::Path;

use tracing::info;

use crate::error::AppError;
use crate::transcribe::{TranscribeConfig, Transcriber, Transcription};

/// Everything computed by one `tabify transcribe` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub notes_read: usize,
    pub run: Transcription,
}

/// Read `path` and transcribe it with `config`.
pub fn run_file(path: &Path, config: &TranscribeConfig) -> Result<RunOutput, AppError> {
    let notes = crate::io::ingest::read_notes(path)?;
    info!(path = %path.display(), notes = notes.len(), "read note events");

    let run = Transcriber::new(config.clone()).transcribe(&notes)?;
    Ok(RunOutput {
        notes_read: notes.len(),
        run,
    })
}
