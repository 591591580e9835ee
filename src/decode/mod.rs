//! Decoders for the caption wire formats served by the captions endpoint.
//!
//! Each decoder is a pure, total function from a raw payload to flat text:
//! malformed input decodes to an empty string, never an error. Cue text is
//! HTML-entity decoded, stripped of inline markup, and whitespace-normalized
//! before emission; when timestamps are requested each cue is prefixed with a
//! `[H:MM:SS]` or `[M:SS]` clock rendering of its start time.

use scraper::Html;
use url::Url;

mod json3;
mod srv3;
mod vtt;
mod xml;

/// One of the wire formats the captions endpoint can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionFormat {
    /// Event-stream JSON (`fmt=json3`).
    Json3,
    /// WebVTT (`fmt=vtt`).
    Vtt,
    /// Start/duration XML, the endpoint's default when `fmt` is absent.
    Xml,
    /// Segment XML (`fmt=srv3`).
    Srv3,
}

impl CaptionFormat {
    /// Value of the `fmt` query parameter requesting this format, if any.
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            CaptionFormat::Json3 => Some("json3"),
            CaptionFormat::Vtt => Some("vtt"),
            CaptionFormat::Xml => None,
            CaptionFormat::Srv3 => Some("srv3"),
        }
    }

    pub fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "json3" => Some(CaptionFormat::Json3),
            "vtt" => Some(CaptionFormat::Vtt),
            "srv3" => Some(CaptionFormat::Srv3),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaptionFormat::Json3 => "json3",
            CaptionFormat::Vtt => "vtt",
            CaptionFormat::Xml => "xml",
            CaptionFormat::Srv3 => "srv3",
        }
    }

    /// Decode a payload of this format into flat transcript text.
    pub fn decode(&self, raw: &str, include_timestamps: bool) -> String {
        match self {
            CaptionFormat::Json3 => json3::decode(raw, include_timestamps),
            CaptionFormat::Vtt => vtt::decode(raw, include_timestamps),
            CaptionFormat::Xml => xml::decode(raw, include_timestamps),
            CaptionFormat::Srv3 => srv3::decode(raw, include_timestamps),
        }
    }
}

/// Decode a payload of unknown origin by inspecting its leading characters.
///
/// Used by the network-capture tier, which does not control the wire format of
/// the requests it observes.
pub fn sniff_decode(raw: &str, include_timestamps: bool) -> String {
    let lead = raw.trim_start();

    if lead.starts_with('{') {
        let text = json3::decode(raw, include_timestamps);
        if !text.is_empty() {
            return text;
        }
    }

    if lead.starts_with("WEBVTT") {
        let text = vtt::decode(raw, include_timestamps);
        if !text.is_empty() {
            return text;
        }
    }

    let text = xml::decode(raw, include_timestamps);
    if !text.is_empty() {
        return text;
    }

    srv3::decode(raw, include_timestamps)
}

/// Decode a captured payload, honoring an explicit `fmt` query value on the
/// URL it came from before falling back to sniffing.
pub fn decode_for_url(url: &str, raw: &str, include_timestamps: bool) -> String {
    if let Ok(parsed) = Url::parse(url) {
        let fmt = parsed
            .query_pairs()
            .find(|(key, _)| key == "fmt")
            .map(|(_, value)| value.to_lowercase());

        if let Some(format) = fmt.as_deref().and_then(CaptionFormat::from_query_value) {
            let text = format.decode(raw, include_timestamps);
            if !text.is_empty() {
                return text;
            }
        }
    }

    sniff_decode(raw, include_timestamps)
}

/// Render whole seconds as `H:MM:SS`, or `M:SS` under an hour.
pub(crate) fn seconds_to_clock(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Collapse all runs of whitespace to single spaces and trim.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip inline markup tags, decode HTML entities, and normalize whitespace.
///
/// Goes through an HTML fragment parse so that entity handling matches what a
/// browser would produce for the same cue text.
pub(crate) fn clean_markup(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text: String = fragment.root_element().text().collect();
    collapse_whitespace(&text)
}
