//! ASCII tablature.
//!
//! ```text
//! E|-0-3-|
//! B|-1-0-|
//! G|-0-0-|
//! D|-2-0-|
//! A|-3-2-|
//! E|---3-|
//! ```
//!
//! Each column is as wide as its widest fret number; silent strings are dashes.

use crate::fretboard::Guitar;
use crate::tab::Tab;

/// Default width a rendered block is wrapped at.
pub const DEFAULT_LINE_LEN: usize = 80;

/// Render `tab`, wrapping into blocks no wider than `line_len` where possible.
pub fn render_tab(tab: &Tab, line_len: usize) -> String {
    render_columns(&tab.guitar, &tab.columns(), line_len)
}

pub fn render_columns(guitar: &Guitar, columns: &[Vec<Option<u8>>], line_len: usize) -> String {
    let labels = string_labels(guitar);
    let label_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
    // label, "|", and the closing "-|"
    let frame = label_width + 3;

    let cells: Vec<(usize, &Vec<Option<u8>>)> = columns.iter().map(|c| (column_width(c), c)).collect();

    let mut blocks: Vec<&[(usize, &Vec<Option<u8>>)]> = Vec::new();
    let mut start = 0;
    let mut width = frame;
    for (idx, (w, _)) in cells.iter().enumerate() {
        if idx > start && width + w + 1 > line_len {
            blocks.push(&cells[start..idx]);
            start = idx;
            width = frame;
        }
        width += w + 1;
    }
    if start < cells.len() {
        blocks.push(&cells[start..]);
    }

    let mut out = String::new();
    for (b, block) in blocks.iter().enumerate() {
        if b > 0 {
            out.push('\n');
        }
        // Highest string first.
        for string in (1..=guitar.num_strings()).rev() {
            let label = &labels[string as usize - 1];
            out.push_str(&format!("{label:<label_width$}|"));
            for (w, column) in block.iter() {
                let cell = column
                    .get(string as usize - 1)
                    .copied()
                    .flatten()
                    .map(|fret| fret.to_string())
                    .unwrap_or_default();
                out.push('-');
                out.push_str(&format!("{cell:-<w$}", w = *w));
            }
            out.push_str("-|\n");
        }
    }
    out
}

fn string_labels(guitar: &Guitar) -> Vec<String> {
    guitar.tuning().iter().map(|p| p.name().to_string()).collect()
}

fn column_width(column: &[Option<u8>]) -> usize {
    column
        .iter()
        .flatten()
        .map(|fret| fret.to_string().len())
        .max()
        .unwrap_or(1)
}
