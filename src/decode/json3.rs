//! Event-stream JSON decoder (`fmt=json3`).

use serde::Deserialize;

use super::{clean_markup, seconds_to_clock};

#[derive(Debug, Deserialize)]
struct EventStream {
    #[serde(default)]
    events: Vec<CueEvent>,
}

#[derive(Debug, Deserialize)]
struct CueEvent {
    /// Cue start offset in milliseconds.
    #[serde(rename = "tStartMs")]
    start_ms: Option<f64>,
    #[serde(default)]
    segs: Vec<CueSegment>,
}

#[derive(Debug, Deserialize)]
struct CueSegment {
    utf8: Option<String>,
}

/// Concatenate each event's text fragments; events decoding to empty text are
/// skipped. Timestamps are the event start floored to whole seconds.
pub(super) fn decode(raw: &str, include_timestamps: bool) -> String {
    let Ok(stream) = serde_json::from_str::<EventStream>(raw) else {
        return String::new();
    };

    let mut parts = Vec::new();
    for event in stream.events {
        let joined: String = event
            .segs
            .iter()
            .filter_map(|segment| segment.utf8.as_deref())
            .collect();

        let text = clean_markup(&joined);
        if text.is_empty() {
            continue;
        }

        match event.start_ms.filter(|_| include_timestamps) {
            Some(ms) => {
                let seconds = (ms / 1000.0).floor().max(0.0) as u64;
                parts.push(format!("[{}] {}", seconds_to_clock(seconds), text));
            }
            None => parts.push(text),
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_EVENTS: &str = r#"{
        "events": [
            {"tStartMs": 1000, "segs": [{"utf8": "Hello"}]},
            {"tStartMs": 2500, "segs": [{"utf8": "world"}]}
        ]
    }"#;

    #[test]
    fn test_decodes_events_with_timestamps() {
        assert_eq!(decode(TWO_EVENTS, true), "[0:01] Hello [0:02] world");
    }

    #[test]
    fn test_decodes_events_without_timestamps() {
        assert_eq!(decode(TWO_EVENTS, false), "Hello world");
    }

    #[test]
    fn test_joins_fragments_within_one_event() {
        let raw = r#"{"events":[{"tStartMs":0,"segs":[{"utf8":"Hel"},{"utf8":"lo "},{"utf8":" there"}]}]}"#;
        assert_eq!(decode(raw, false), "Hello there");
    }

    #[test]
    fn test_skips_events_without_text() {
        let raw = r#"{"events":[
            {"tStartMs":0,"segs":[{"utf8":"\n"}]},
            {"tStartMs":500},
            {"tStartMs":1000,"segs":[{"utf8":"kept"}]}
        ]}"#;
        assert_eq!(decode(raw, true), "[0:01] kept");
    }

    #[test]
    fn test_malformed_input_decodes_to_empty() {
        assert_eq!(decode("", true), "");
        assert_eq!(decode("not json", true), "");
        assert_eq!(decode(r#"{"events": "wrong shape"}"#, true), "");
        assert_eq!(decode(r#"{"unrelated": true}"#, true), "");
    }

    #[test]
    fn test_decoding_is_pure() {
        assert_eq!(decode(TWO_EVENTS, true), decode(TWO_EVENTS, true));
    }
}
