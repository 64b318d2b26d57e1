//! Debug dump of the fingering store, for inspecting why a path was chosen.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::AppError;
use crate::store::FingeringStore;
use crate::transcribe::TranscribeConfig;

/// Write a markdown dump of `store` under `dir` and return its path.
pub fn write_store_dump(dir: &Path, store: &FingeringStore, config: &TranscribeConfig) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::internal(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("tabify_store_{ts}.md"));
    let mut file =
        File::create(&path).map_err(|e| AppError::internal(format!("Failed to create debug file: {e}")))?;

    write_dump(&mut file, store, config)
        .map_err(|e| AppError::internal(format!("Failed to write debug file: {e}")))?;
    Ok(path)
}

fn write_dump(out: &mut impl Write, store: &FingeringStore, config: &TranscribeConfig) -> std::io::Result<()> {
    writeln!(out, "# tabify fingering store")?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(
        out,
        "- guitar: {} ({} frets)",
        config.guitar,
        config.guitar.num_frets()
    )?;
    writeln!(
        out,
        "- weights: stretch={:.2}, transition={:.2}",
        config.weights.stretch, config.weights.transition
    )?;
    writeln!(
        out,
        "- chords: {}, fingerings: {}",
        store.chord_count(),
        store.fingering_count()
    )?;

    for id in store.chord_ids() {
        writeln!(out, "\n## {id}")?;
        writeln!(out, "| # | positions | stretch | to | from |")?;
        writeln!(out, "| - | - | - | - | - |")?;
        let fingerings = store.fingerings(id).map_err(|e| std::io::Error::other(e.message().to_string()))?;
        for (idx, f) in fingerings.iter().enumerate() {
            let positions: Vec<String> = f
                .placements()
                .iter()
                .map(|(finger, p)| format!("{}@{p}", finger.label()))
                .collect();
            writeln!(
                out,
                "| {idx} | {} | {:.3} | {} | {} |",
                positions.join(" "),
                f.stretch_cost(),
                fmt_links(f.linked_to()),
                fmt_links(f.linked_from())
            )?;
        }
    }
    Ok(())
}

fn fmt_links<'a>(links: impl Iterator<Item = (&'a crate::domain::ChordId, usize)>) -> String {
    let mut parts: Vec<String> = links.map(|(id, n)| format!("{id} ({n})")).collect();
    if parts.is_empty() {
        return "-".to_string();
    }
    parts.sort();
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Note, Pitch};
    use crate::transcribe::Transcriber;

    #[test]
    fn dump_lists_every_chord_and_link() {
        let config = TranscribeConfig::standard().unwrap();
        let notes = vec![Note::new(Pitch(48), 0.0, 1.0), Note::new(Pitch(55), 1.0, 1.0)];
        let run = Transcriber::new(config.clone()).transcribe(&notes).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = write_store_dump(dir.path(), &run.store, &config).unwrap();
        let text = std::fs::read_to_string(path).unwrap();

        assert!(text.contains("## C3"));
        assert!(text.contains("## G3"));
        assert!(text.contains("| G3 ("));
        assert!(text.contains("- chords: 2"));
    }
}
