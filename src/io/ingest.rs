//! CSV ingest of note events.
//!
//! Expected schema (header required, column order free):
//!
//! ```text
//! pitch,offset,duration
//! E2,0,1
//! 64,0,1
//! ```
//!
//! `pitch` is a scientific pitch name or a MIDI number; `offset` and `duration`
//! are in quarter notes. Any bad row aborts the read with the line it was on.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Note, Pitch};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 3] = ["pitch", "offset", "duration"];

/// Read note events from a CSV file.
pub fn read_notes(path: &Path) -> Result<Vec<Note>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_notes_from(file)
}

/// Read note events from any CSV source.
pub fn read_notes_from<R: Read>(source: R) -> Result<Vec<Note>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = header_map(&headers)?;

    let mut notes = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::config(format!("Line {line}: CSV parse error: {e}")))?;
        let note = parse_row(&record, &columns).map_err(|msg| AppError::config(format!("Line {line}: {msg}")))?;
        notes.push(note);
    }
    Ok(notes)
}

fn header_map(headers: &StringRecord) -> Result<HashMap<&'static str, usize>, AppError> {
    let mut map = HashMap::new();
    for name in REQUIRED_COLUMNS {
        let idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                AppError::config(format!(
                    "CSV is missing the '{name}' column (expected header: {}).",
                    REQUIRED_COLUMNS.join(",")
                ))
            })?;
        map.insert(name, idx);
    }
    Ok(map)
}

fn field<'a>(record: &'a StringRecord, columns: &HashMap<&'static str, usize>, name: &str) -> Result<&'a str, String> {
    columns
        .get(name)
        .and_then(|&idx| record.get(idx))
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("missing {name}"))
}

fn parse_row(record: &StringRecord, columns: &HashMap<&'static str, usize>) -> Result<Note, String> {
    let pitch: Pitch = field(record, columns, "pitch")?
        .parse()
        .map_err(|e: AppError| e.message().to_string())?;
    let offset = parse_number(field(record, columns, "offset")?, "offset")?;
    let duration = parse_number(field(record, columns, "duration")?, "duration")?;

    if offset < 0.0 {
        return Err(format!("offset must be non-negative (got {offset})"));
    }
    if duration <= 0.0 {
        return Err(format!("duration must be positive (got {duration})"));
    }
    Ok(Note::new(pitch, offset, duration))
}

fn parse_number(raw: &str, name: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("invalid {name} '{raw}'"))?;
    if !value.is_finite() {
        return Err(format!("{name} must be finite (got {raw})"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EXIT_CONFIG;

    #[test]
    fn reads_names_and_midi_numbers() {
        let csv = "pitch,offset,duration\nE2,0,1\n64, 0 ,1\nF#3,1.5,0.5\n";
        let notes = read_notes_from(csv.as_bytes()).unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].pitch, Pitch(40));
        assert_eq!(notes[1].pitch, Pitch(64));
        assert_eq!(notes[2], Note::new(Pitch(54), 1.5, 0.5));
    }

    #[test]
    fn columns_can_be_reordered() {
        let csv = "Duration,Pitch,Offset\n2,C4,0\n";
        let notes = read_notes_from(csv.as_bytes()).unwrap();
        assert_eq!(notes, vec![Note::new(Pitch(60), 0.0, 2.0)]);
    }

    #[test]
    fn missing_column_is_a_config_error() {
        let err = read_notes_from("pitch,offset\nE2,0\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
        assert!(err.message().contains("duration"));
    }

    #[test]
    fn bad_rows_name_their_line() {
        let csv = "pitch,offset,duration\nE2,0,1\nX9,1,1\n";
        let err = read_notes_from(csv.as_bytes()).unwrap_err();
        assert!(err.message().starts_with("Line 3:"), "{}", err.message());

        let csv = "pitch,offset,duration\nE2,0,0\n";
        let err = read_notes_from(csv.as_bytes()).unwrap_err();
        assert!(err.message().contains("duration must be positive"));

        let csv = "pitch,offset,duration\nE2,-1,1\n";
        assert!(read_notes_from(csv.as_bytes()).is_err());

        for pitch in ["C178956970", "-2147483648", "200"] {
            let csv = format!("pitch,offset,duration\nE2,0,1\n{pitch},1,1\n");
            let err = read_notes_from(csv.as_bytes()).unwrap_err();
            assert_eq!(err.exit_code(), EXIT_CONFIG);
            assert!(err.message().starts_with("Line 3:"), "{}", err.message());
        }
    }

    #[test]
    fn header_only_file_is_empty() {
        assert!(read_notes_from("pitch,offset,duration\n".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.csv");
        std::fs::write(&path, "pitch,offset,duration\nA2,0,1\n").unwrap();
        assert_eq!(read_notes(&path).unwrap().len(), 1);
        assert!(read_notes(&dir.path().join("missing.csv")).is_err());
    }
}
