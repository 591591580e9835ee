//! Segment XML decoder (`fmt=srv3`).
//!
//! Payload shape: `<timedtext><body><p t="1000" d="2000"><s>Hel</s><s>lo</s></p></body></timedtext>`,
//! where `t` is the paragraph start in milliseconds.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{collapse_whitespace, seconds_to_clock};

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("paragraph selector"));
static SEGMENT: Lazy<Selector> = Lazy::new(|| Selector::parse("s").expect("segment selector"));

/// Concatenate the nested `<s>` fragments of each `<p>`, or take the
/// paragraph's own text when it has no `<s>` children.
pub(super) fn decode(raw: &str, include_timestamps: bool) -> String {
    let document = Html::parse_document(raw);

    let mut parts = Vec::new();
    for paragraph in document.select(&PARAGRAPH) {
        let fragments: Vec<String> = paragraph
            .select(&SEGMENT)
            .map(|segment| segment.text().collect::<String>())
            .collect();

        let joined = if fragments.is_empty() {
            paragraph.text().collect::<String>()
        } else {
            fragments.concat()
        };

        let text = collapse_whitespace(&joined);
        if text.is_empty() {
            continue;
        }

        let start_ms = paragraph
            .value()
            .attr("t")
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|_| include_timestamps);

        match start_ms {
            Some(ms) => {
                let seconds = (ms / 1000.0).floor().max(0.0) as u64;
                parts.push(format!("[{}] {}", seconds_to_clock(seconds), text));
            }
            None => parts.push(text),
        }
    }

    parts.join(" ")
}
