use crate::domain::Chord;
use crate::fingering::Fingering;
use crate::fretboard::Guitar;
use crate::tab::{finger_diagram, render_columns};
use crate::transcribe::{TranscribeConfig, Transcription};

/// Run summary: instrument, strategy, sizes and the path cost.
pub fn format_run_summary(run: &Transcription, config: &TranscribeConfig) -> String {
    let mut out = String::new();
    let guitar = &config.guitar;

    out.push_str("=== tabify ===\n");
    out.push_str(&format!(
        "Guitar: {} ({} strings, {} frets)\n",
        guitar,
        guitar.num_strings(),
        guitar.num_frets()
    ));
    out.push_str(&format!(
        "Strategy: {} | weights: stretch={:.2} transition={:.2}\n",
        config.strategy.display_name(),
        config.weights.stretch,
        config.weights.transition
    ));
    if run.tab.transposition != 0 {
        out.push_str(&format!("Transposed: {:+} semitones\n", run.tab.transposition));
    }
    out.push_str(&format!(
        "Chords: {} ({} distinct, {} simplified) | fingerings cached: {}\n",
        run.tab.len(),
        run.store.chord_count(),
        run.simplified,
        run.store.fingering_count()
    ));
    out.push_str(&format!("Total cost: {:.3}\n", run.tab.total_cost));
    out
}

/// Every fingering of one chord, cheapest stretch first, with a tab column and finger map each.
pub fn format_chord_fingerings(chord: &Chord, played: &Chord, fingerings: &[Fingering], guitar: &Guitar) -> String {
    let mut out = String::new();
    out.push_str(&format!("Chord: {}\n", chord.id()));
    if played.pitches() != chord.pitches() {
        out.push_str(&format!("Simplified to: {}\n", played.id()));
    }
    out.push_str(&format!("Fingerings: {}\n", fingerings.len()));

    let mut ranked: Vec<&Fingering> = fingerings.iter().collect();
    ranked.sort_by(|a, b| {
        a.stretch_cost()
            .total_cmp(&b.stretch_cost())
            .then_with(|| a.fret_total().cmp(&b.fret_total()))
    });

    for (rank, fingering) in ranked.iter().enumerate() {
        out.push_str(&format!(
            "\n#{} stretch={:.3}{}\n",
            rank + 1,
            fingering.stretch_cost(),
            if fingering.is_barre() { " (barre)" } else { "" }
        ));
        out.push_str(&render_columns(guitar, &[fingering.column(guitar.num_strings())], usize::MAX));
        out.push_str(&finger_diagram(fingering));
    }
    out
}
