//! WebVTT decoder (`fmt=vtt`).

use once_cell::sync::Lazy;
use regex::Regex;

use super::clean_markup;

/// Cue-timing line, e.g. `00:00:01.000 --> 00:00:02.000` with an optional hours field.
static CUE_TIMING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{1,2}:)?\d{2}:\d{2}\.\d{3} --> ").expect("cue timing pattern"));

/// Bare numeric cue-index line.
static CUE_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("cue index pattern"));

/// Milliseconds suffix of a retained start time, dropped for compactness.
static TRAILING_MS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\d{3}$").expect("ms suffix pattern"));

/// Line-oriented parse: a timing line opens a cue, following non-blank lines
/// are its text, and a blank line flushes the buffered cue. Text outside any
/// cue (headers, notes, payloads that are not WebVTT at all) is dropped.
pub(super) fn decode(raw: &str, include_timestamps: bool) -> String {
    let mut out = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut cue_start = String::new();
    let mut in_cue = false;

    for line in raw.lines() {
        if line.trim().is_empty() {
            flush(&mut buffer, &mut cue_start, &mut out, include_timestamps);
            in_cue = false;
            continue;
        }

        if CUE_TIMING.is_match(line) {
            let start = line.split(" --> ").next().unwrap_or_default().trim();
            cue_start = TRAILING_MS.replace(start, "").into_owned();
            in_cue = true;
            continue;
        }

        if line.starts_with("WEBVTT") || CUE_INDEX.is_match(line) {
            continue;
        }

        if in_cue {
            buffer.push(line);
        }
    }
    flush(&mut buffer, &mut cue_start, &mut out, include_timestamps);

    out.join(" ")
}

fn flush(buffer: &mut Vec<&str>, cue_start: &mut String, out: &mut Vec<String>, include_timestamps: bool) {
    if buffer.is_empty() {
        return;
    }

    let text = clean_markup(&buffer.join(" "));
    if !text.is_empty() {
        if include_timestamps && !cue_start.is_empty() {
            out.push(format!("[{}] {}", cue_start, text));
        } else {
            out.push(text);
        }
    }

    buffer.clear();
    cue_start.clear();
}
