//! Start/duration XML decoder, the endpoint's default when no `fmt` is requested.
//!
//! Payload shape: `<transcript><text start="1.2" dur="3.4">Hi</text></transcript>`.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{collapse_whitespace, seconds_to_clock};

static TEXT_NODE: Lazy<Selector> = Lazy::new(|| Selector::parse("text").expect("text selector"));

/// One segment per `<text>` node; `start` is fractional seconds, floored for
/// display. The lenient HTML tree builder tolerates the XML prolog and decodes
/// entities during the parse.
pub(super) fn decode(raw: &str, include_timestamps: bool) -> String {
    let document = Html::parse_document(raw);

    let mut parts = Vec::new();
    for node in document.select(&TEXT_NODE) {
        let text = collapse_whitespace(&node.text().collect::<String>());
        if text.is_empty() {
            continue;
        }

        let start = node
            .value()
            .attr("start")
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|_| include_timestamps);

        match start {
            Some(seconds) => {
                let floored = seconds.floor().max(0.0) as u64;
                parts.push(format!("[{}] {}", seconds_to_clock(floored), text));
            }
            None => parts.push(text),
        }
    }

    parts.join(" ")
}
