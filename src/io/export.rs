//! JSON export of a finished tab.
//!
//! The file carries enough to redraw the tab elsewhere: the tuning, every
//! chord with its per-string frets and finger map, and the path cost.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Finger, Position, Strategy};
use crate::error::AppError;
use crate::tab::Tab;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabFile {
    pub tool: String,
    pub tuning: Vec<String>,
    pub frets: u8,
    pub strategy: Strategy,
    pub transposition: i32,
    pub total_cost: f64,
    pub chords: Vec<TabFileChord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabFileChord {
    pub chord: String,
    pub offset: f64,
    pub duration: f64,
    /// Fret per string, lowest string first; `null` for silent strings.
    pub frets: Vec<Option<u8>>,
    pub fingers: BTreeMap<Finger, Vec<Position>>,
    pub stretch_cost: f64,
}

impl TabFile {
    pub fn from_tab(tab: &Tab) -> Self {
        let strings = tab.guitar.num_strings();
        let chords = tab
            .entries
            .iter()
            .map(|entry| {
                let fingers = entry
                    .fingering
                    .placements()
                    .into_iter()
                    .fold(BTreeMap::new(), |mut map: BTreeMap<Finger, Vec<Position>>, (finger, position)| {
                        map.entry(finger).or_default().push(position);
                        map
                    });
                TabFileChord {
                    chord: entry.chord.to_string(),
                    offset: entry.offset,
                    duration: entry.duration,
                    frets: entry.fingering.column(strings),
                    fingers,
                    stretch_cost: entry.fingering.stretch_cost(),
                }
            })
            .collect();

        Self {
            tool: "tabify".to_string(),
            tuning: tab.guitar.tuning().iter().map(ToString::to_string).collect(),
            frets: tab.guitar.num_frets(),
            strategy: tab.strategy,
            transposition: tab.transposition,
            total_cost: tab.total_cost,
            chords,
        }
    }
}

/// Write `tab` as pretty-printed JSON.
pub fn write_tab_json(path: &Path, tab: &Tab) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create tab JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &TabFile::from_tab(tab))
        .map_err(|e| AppError::config(format!("Failed to write tab JSON: {e}")))?;
    Ok(())
}

/// Read a tab JSON file written by [`write_tab_json`].
pub fn read_tab_json(path: &Path) -> Result<TabFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open tab JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::config(format!("Invalid tab JSON: {e}")))
}
