//! Format acquisition for a selected caption track.
//!
//! The endpoint serves several encodings of the same track; they are requested
//! strictly sequentially in a fixed priority order, and the first one that
//! decodes to non-empty text wins. A transport failure on one format only
//! skips that format.

use crate::decode::CaptionFormat;
use crate::discovery::CaptionTrack;
use crate::net::TextFetcher;
use crate::utils;

/// Fixed request priority: event-stream JSON is the most robust, the srv3
/// segment XML the least commonly served.
pub const FORMAT_ORDER: [CaptionFormat; 4] = [
    CaptionFormat::Json3,
    CaptionFormat::Vtt,
    CaptionFormat::Xml,
    CaptionFormat::Srv3,
];

/// Fetch and decode the track, trying each wire format in priority order.
pub async fn fetch_transcript(
    fetcher: &dyn TextFetcher,
    track: &CaptionTrack,
    locale: &str,
    include_timestamps: bool,
) -> Option<String> {
    let translation_target = translation_target(track, locale);
    if let Some(target) = &translation_target {
        tracing::debug!(%target, "requesting translated captions");
    }

    for format in FORMAT_ORDER {
        let url = request_url(&track.base_url, format, translation_target.as_deref());

        let raw = match fetcher.fetch_text(&url).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(format = format.label(), "caption request failed: {err:#}");
                continue;
            }
        };

        let text = format.decode(&raw, include_timestamps);
        if !text.trim().is_empty() {
            tracing::debug!(format = format.label(), "caption format decoded");
            return Some(text);
        }
    }

    None
}

/// Translation is requested iff the caller's base language differs from the
/// track's language and the endpoint offers translation for it. Whether the
/// endpoint actually supports the requested target language is unvalidated;
/// an unsupported target simply decodes empty and the next format (and
/// eventually the next tier) takes over.
pub(crate) fn translation_target(track: &CaptionTrack, locale: &str) -> Option<String> {
    let base = utils::base_language(locale);
    if base.is_empty() || !track.is_translatable {
        return None;
    }

    let track_language = track.language_code.to_lowercase();
    if track_language.is_empty() || track_language == base {
        return None;
    }

    Some(base)
}

/// Build one format request from the track's base URL.
pub(crate) fn request_url(base_url: &str, format: CaptionFormat, translation: Option<&str>) -> String {
    let mut url = base_url.to_string();
    if let Some(target) = translation {
        url = utils::append_param(&url, "tlang", target);
    }
    if let Some(fmt) = format.query_value() {
        url = utils::append_param(&url, "fmt", fmt);
    }
    url
}
