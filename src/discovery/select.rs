//! Deterministic caption-track selection.

use super::{CaptionTrack, TrackKind};
use crate::utils;

/// Pick the single best track from a discovered set.
///
/// Manual tracks are preferred over auto-generated ones regardless of score;
/// within a kind the highest-scoring track wins and ties keep the earliest
/// discovered. Returns the first track overall when no kind produced a pick.
pub fn choose_best_track<'a>(tracks: &'a [CaptionTrack], locale: &str) -> Option<&'a CaptionTrack> {
    let locale = locale.trim().to_lowercase();
    let base = utils::base_language(&locale);

    let manual = best_of(tracks, TrackKind::Manual, &locale, &base);
    manual
        .or_else(|| best_of(tracks, TrackKind::Auto, &locale, &base))
        .or_else(|| tracks.first())
}

fn best_of<'a>(
    tracks: &'a [CaptionTrack],
    kind: TrackKind,
    locale: &str,
    base: &str,
) -> Option<&'a CaptionTrack> {
    let mut best: Option<(i32, &CaptionTrack)> = None;

    for track in tracks.iter().filter(|track| track.kind == kind) {
        let score = score(track, locale, base);
        // Strictly-greater comparison keeps the earliest track on ties.
        if best.map_or(true, |(best_score, _)| score > best_score) {
            best = Some((score, track));
        }
    }

    best.map(|(_, track)| track)
}

fn score(track: &CaptionTrack, locale: &str, base: &str) -> i32 {
    let language = track.language_code.to_lowercase();
    let mut score = 0;

    if !locale.is_empty() && language == locale {
        score += 4;
    }
    if !base.is_empty() && language.starts_with(base) {
        score += 3;
    }
    if track
        .name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains("english"))
    {
        score += 2;
    }
    if track.is_translatable {
        score += 1;
    }

    score
}
