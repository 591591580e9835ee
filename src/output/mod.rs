use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::cli::OutputFormat;

/// Envelope for one completed extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRecord {
    pub video_id: Option<String>,
    pub url: String,
    pub title: Option<String>,
    pub transcript: String,
    pub extracted_at: DateTime<Utc>,
}

/// Save an extraction to file
pub async fn save_to_file(
    record: &ExtractionRecord,
    path: &Path,
    format: &OutputFormat,
    prompt_prefix: Option<&str>,
    with_title: bool,
) -> Result<()> {
    let content = render(record, format, prompt_prefix, with_title)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print an extraction to console
pub fn print_to_console(
    record: &ExtractionRecord,
    format: &OutputFormat,
    prompt_prefix: Option<&str>,
    with_title: bool,
) -> Result<()> {
    let content = render(record, format, prompt_prefix, with_title)?;
    println!("{}", content);
    Ok(())
}

fn render(
    record: &ExtractionRecord,
    format: &OutputFormat,
    prompt_prefix: Option<&str>,
    with_title: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_as_text(record, prompt_prefix, with_title)),
        OutputFormat::Json => format_as_json(record),
    }
}

/// Plain transcript text; with a title or prompt prefix requested, the
/// payload gains the header lines the downstream consumer expects.
fn format_as_text(record: &ExtractionRecord, prompt_prefix: Option<&str>, with_title: bool) -> String {
    if prompt_prefix.is_none() && !with_title {
        return record.transcript.clone();
    }

    let mut out = String::new();
    if let Some(prefix) = prompt_prefix {
        out.push_str(prefix.trim());
        out.push('\n');
    }
    if with_title {
        if let Some(title) = record.title.as_deref() {
            out.push_str("Title: ");
            out.push_str(title);
            out.push('\n');
        }
    }
    out.push_str("Transcript:\n");
    out.push_str(&record.transcript);
    out
}

fn format_as_json(record: &ExtractionRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}
