//! Text summary builder for CLI output.
//!
//! This module formats a finished run as human-readable lines for text mode.

use crate::model::RunSummary;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a text summary from a finished run.
pub(crate) fn build_text_summary(summary: &RunSummary) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!("Run: {}", summary.timestamp_utc));
    lines.push(format!(
        "Outcome: {}",
        if summary.completed {
            "completed"
        } else {
            "cancelled"
        }
    ));

    lines.push("Scenes:".to_string());
    for visit in &summary.scenes {
        let advanced_by = visit
            .advanced_by
            .map(|r| r.as_str())
            .unwrap_or("interrupted");
        lines.push(format!(
            "  {:<10} +{:>6.1}s  {}",
            visit.scene.as_str(),
            visit.entered_at_ms as f64 / 1000.0,
            advanced_by
        ));
    }

    lines.push(format!("Skips: {}", summary.skips));
    lines.push(format!(
        "Cues: {} played, {} suppressed",
        summary.cues_played, summary.cues_suppressed
    ));
    lines.push(format!(
        "Audio: {}",
        if summary.audio_started {
            "background track started"
        } else {
            "no background track"
        }
    ));

    TextSummary { lines }
}
