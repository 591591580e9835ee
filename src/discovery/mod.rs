//! Caption-track discovery.
//!
//! Tracks are located from two independent sources, tried in order: state
//! embedded in the watch page's inline scripts (with a secondary read of a
//! rendered component's exposed data object), then the captions-list endpoint
//! keyed by video id. Failing both yields an empty set, not an error; the
//! orchestrator treats that as a signal to fall through to network capture.

use serde::Serialize;

use crate::engine::PollBudgets;
use crate::net::TextFetcher;
use crate::page::PageSurface;
use crate::utils;

pub(crate) mod embedded;
pub(crate) mod list;
pub(crate) mod select;

pub use select::choose_best_track;

/// One available caption stream for a video, in one language and kind.
#[derive(Debug, Clone, Serialize)]
pub struct CaptionTrack {
    /// BCP-47-ish language code as reported by the page, e.g. "en" or "pt-BR".
    pub language_code: String,

    /// Human-readable display name, when the page provides one.
    pub name: Option<String>,

    /// Whether the track was authored by a human or generated by speech recognition.
    pub kind: TrackKind,

    /// Captions-endpoint URL for this track, without format parameters.
    pub base_url: String,

    /// Whether the endpoint offers machine translation of this track.
    pub is_translatable: bool,
}

/// Manually authored captions are higher quality than speech-recognition
/// output, and the selector prefers them unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Manual,
    Auto,
}

impl TrackKind {
    /// The page and the list endpoint both mark speech-recognition tracks with
    /// kind "asr"; anything else is treated as manual.
    pub(crate) fn from_page_kind(kind: Option<&str>) -> Self {
        match kind {
            Some(value) if value.eq_ignore_ascii_case("asr") => TrackKind::Auto,
            _ => TrackKind::Manual,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrackKind::Manual => "manual",
            TrackKind::Auto => "auto",
        }
    }
}

/// Locate the caption tracks available for the page's video.
///
/// Embedded state is polled under the discovery attempt budget because the
/// page may still be hydrating when the first scan runs; the list endpoint is
/// consulted once afterwards. An empty result means "no tracks", never an
/// error.
pub async fn discover_tracks(
    page: &dyn PageSurface,
    fetcher: &dyn TextFetcher,
    budgets: &PollBudgets,
) -> Vec<CaptionTrack> {
    let embedded_tracks = utils::retry(budgets.discovery_attempts, budgets.discovery_delay(), || {
        async move { embedded::tracks_from_page(page) }
    })
    .await;

    if let Some(tracks) = embedded_tracks {
        tracing::debug!(count = tracks.len(), "found embedded caption tracks");
        return tracks;
    }

    let Some(video_id) = utils::video_id(&page.page_url()) else {
        tracing::debug!("no embedded tracks and no video id; cannot query the list endpoint");
        return Vec::new();
    };

    match list::tracks_from_list_endpoint(fetcher, &video_id).await {
        Ok(tracks) => {
            tracing::debug!(count = tracks.len(), "list endpoint returned caption tracks");
            tracks
        }
        Err(err) => {
            tracing::debug!("captions list endpoint failed: {err:#}");
            Vec::new()
        }
    }
}
