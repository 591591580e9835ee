//! The DOM transcript-panel tier.
//!
//! First-choice acquisition path: read the rendered transcript panel directly,
//! bypassing network access entirely. Every failure here is silent; the
//! orchestrator falls through to the structured caption pipeline.

use crate::engine::PollBudgets;
use crate::page::{PageSurface, TranscriptRow};
use crate::utils;

/// Scrape the rendered transcript panel, revealing it first when necessary.
///
/// Returns `None` when the panel cannot be obtained (control absent, panel
/// never populates) so the caller can advance to the next tier.
pub async fn scrape_transcript(
    page: &dyn PageSurface,
    include_timestamps: bool,
    budgets: &PollBudgets,
) -> Option<String> {
    let mut rows = page.transcript_rows();

    if rows.is_empty() {
        if !page.reveal_transcript_panel() {
            return None;
        }

        // The panel fills in asynchronously after its control is activated.
        rows = utils::retry(budgets.panel_attempts, budgets.panel_delay(), || {
            async move {
                let rows = page.transcript_rows();
                (!rows.is_empty()).then_some(rows)
            }
        })
        .await?;
    }

    let text = join_rows(&rows, include_timestamps);
    if text.is_empty() {
        return None;
    }

    tracing::debug!(rows = rows.len(), "scraped transcript panel");
    Some(text)
}

fn join_rows(rows: &[TranscriptRow], include_timestamps: bool) -> String {
    rows.iter()
        .filter(|row| !row.text.is_empty())
        .map(|row| match row.timestamp.as_deref().filter(|_| include_timestamps) {
            Some(label) => format!("[{}] {}", label, row.text),
            None => row.text.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
