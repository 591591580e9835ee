//! Captions-list endpoint fallback.
//!
//! Queries `/api/timedtext?type=list` for the video and maps each `<track>`
//! element into the canonical [`CaptionTrack`] shape, constructing the base
//! request URL the acquirer will decorate with format parameters.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use super::{CaptionTrack, TrackKind};
use crate::net::TextFetcher;
use crate::Result;

const TIMEDTEXT_ENDPOINT: &str = "https://www.youtube.com/api/timedtext";

static TRACK_NODE: Lazy<Selector> = Lazy::new(|| Selector::parse("track").expect("track selector"));

/// Fetch and parse the track list for a video id.
pub(crate) async fn tracks_from_list_endpoint(
    fetcher: &dyn TextFetcher,
    video_id: &str,
) -> Result<Vec<CaptionTrack>> {
    let list_url = format!(
        "{}?type=list&hl=en&v={}",
        TIMEDTEXT_ENDPOINT,
        urlencoding::encode(video_id)
    );

    tracing::debug!(%list_url, "querying captions list endpoint");
    let xml = fetcher.fetch_text(&list_url).await?;

    Ok(parse_track_list(&xml, video_id))
}

/// Map `<track lang_code=".." name=".." kind=".." translate="..">` elements
/// into caption tracks. Unknown or incomplete elements are skipped.
pub(crate) fn parse_track_list(xml: &str, video_id: &str) -> Vec<CaptionTrack> {
    let document = Html::parse_document(xml);

    document
        .select(&TRACK_NODE)
        .filter_map(|node| {
            let attrs = node.value();
            let language_code = attrs
                .attr("lang_code")
                .or_else(|| attrs.attr("lang"))
                .filter(|code| !code.is_empty())?;

            let name = attrs.attr("name").filter(|name| !name.is_empty());
            let kind = TrackKind::from_page_kind(attrs.attr("kind"));
            let is_translatable = attrs
                .attr("translate")
                .is_some_and(|value| value.eq_ignore_ascii_case("true"));

            let mut base = Url::parse(TIMEDTEXT_ENDPOINT).ok()?;
            {
                let mut pairs = base.query_pairs_mut();
                pairs.append_pair("v", video_id);
                pairs.append_pair("lang", language_code);
                if kind == TrackKind::Auto {
                    pairs.append_pair("kind", "asr");
                }
                if let Some(name) = name {
                    pairs.append_pair("name", name);
                }
            }

            Some(CaptionTrack {
                language_code: language_code.to_string(),
                name: name.map(str::to_string),
                kind,
                base_url: base.to_string(),
                is_translatable,
            })
        })
        .collect()
}
