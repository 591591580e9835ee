//! Caption tracks embedded in the watch page's inline script state.
//!
//! The player state object is a JS assignment inside a `<script>` body, so it
//! cannot be located with a selector; instead the scanner finds the assignment
//! by name and slices out the balanced JSON object that follows it, skipping
//! string-quoted content (including escaped quotes) so braces inside cue text
//! or URLs do not fool the depth count.

use serde::Deserialize;
use serde_json::Value;

use super::{CaptionTrack, TrackKind};
use crate::page::PageSurface;

const PLAYER_RESPONSE_KEY: &str = "ytInitialPlayerResponse";
const CAPTION_TRACKS_KEY: &str = "\"captionTracks\"";
const TRACKLIST_POINTER: &str = "/captions/playerCaptionsTracklistRenderer/captionTracks";

/// Embedded caption-track shape as it appears in page state.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCaptionTrack {
    base_url: Option<String>,
    language_code: Option<String>,
    kind: Option<String>,
    name: Option<TrackName>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
}

impl RawCaptionTrack {
    fn into_track(self) -> Option<CaptionTrack> {
        let base_url = self.base_url.filter(|url| !url.is_empty())?;

        Some(CaptionTrack {
            language_code: self.language_code.unwrap_or_default(),
            name: self
                .name
                .and_then(|name| name.simple_text)
                .filter(|text| !text.is_empty()),
            kind: TrackKind::from_page_kind(self.kind.as_deref()),
            base_url,
            is_translatable: self.is_translatable,
        })
    }
}

/// One discovery pass over the page surface: inline scripts first, then the
/// rendered component's data object. Returns `None` when nothing was found so
/// the caller's retry loop can run another pass.
pub(crate) fn tracks_from_page(page: &dyn PageSurface) -> Option<Vec<CaptionTrack>> {
    let scripts = page.inline_scripts();
    if let Some(tracks) = tracks_from_scripts(&scripts) {
        return Some(tracks);
    }

    let data = page.player_response_data()?;
    tracks_from_player_response(&data)
}

/// Scan inline script texts for the player state object, or failing that a
/// standalone caption-track array literal.
pub(crate) fn tracks_from_scripts(scripts: &[String]) -> Option<Vec<CaptionTrack>> {
    for script in scripts {
        let Some(key_at) = script.find(PLAYER_RESPONSE_KEY) else {
            continue;
        };
        let Some(open_at) = script[key_at..].find('{').map(|offset| key_at + offset) else {
            continue;
        };
        let Some(slice) = balanced_slice(script, open_at, '{', '}') else {
            continue;
        };
        let Ok(player_response) = serde_json::from_str::<Value>(slice) else {
            continue;
        };
        if let Some(tracks) = tracks_from_player_response(&player_response) {
            return Some(tracks);
        }
    }

    for script in scripts {
        let Some(key_at) = script.find(CAPTION_TRACKS_KEY) else {
            continue;
        };
        let Some(open_at) = script[key_at..].find('[').map(|offset| key_at + offset) else {
            continue;
        };
        let Some(slice) = balanced_slice(script, open_at, '[', ']') else {
            continue;
        };
        let Ok(raw_tracks) = serde_json::from_str::<Vec<RawCaptionTrack>>(slice) else {
            continue;
        };

        let tracks: Vec<CaptionTrack> = raw_tracks
            .into_iter()
            .filter_map(RawCaptionTrack::into_track)
            .collect();
        if !tracks.is_empty() {
            return Some(tracks);
        }
    }

    None
}

/// Walk a parsed player response down to its caption-track list.
pub(crate) fn tracks_from_player_response(player_response: &Value) -> Option<Vec<CaptionTrack>> {
    let track_list = player_response.pointer(TRACKLIST_POINTER)?;
    let raw_tracks: Vec<RawCaptionTrack> = serde_json::from_value(track_list.clone()).ok()?;

    let tracks: Vec<CaptionTrack> = raw_tracks
        .into_iter()
        .filter_map(RawCaptionTrack::into_track)
        .collect();

    if tracks.is_empty() {
        None
    } else {
        Some(tracks)
    }
}

/// Slice the balanced `open`..`close` run starting at `open_at` (which must
/// point at the opening delimiter), ignoring delimiters inside double-quoted
/// strings and honoring backslash escapes.
fn balanced_slice(text: &str, open_at: usize, open: char, close: char) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[open_at..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(&text[open_at..open_at + offset + close.len_utf8()]);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripts(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_balanced_slice_skips_quoted_delimiters() {
        let text = r#"prefix {"a": "close } inside", "b": {"c": 1}} suffix"#;
        let open = text.find('{').unwrap();
        assert_eq!(
            balanced_slice(text, open, '{', '}'),
            Some(r#"{"a": "close } inside", "b": {"c": 1}}"#)
        );
    }

    #[test]
    fn test_balanced_slice_honors_escaped_quotes() {
        let text = r#"{"a": "quote \" then } brace", "b": 2}"#;
        assert_eq!(balanced_slice(text, 0, '{', '}'), Some(text));
    }

    #[test]
    fn test_balanced_slice_unterminated_returns_none() {
        assert_eq!(balanced_slice(r#"{"a": 1"#, 0, '{', '}'), None);
    }

    #[test]
    fn test_finds_tracks_in_player_response_assignment() {
        let script = r#"var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[
            {"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","languageCode":"en","name":{"simpleText":"English"},"isTranslatable":true},
            {"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de&kind=asr","languageCode":"de","kind":"asr"}
        ]}},"videoDetails":{"title":"irrelevant {brace} in \"string\""}};"#;

        let tracks = tracks_from_scripts(&scripts(&["var unrelated = 1;", script])).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].language_code, "en");
        assert_eq!(tracks[0].name.as_deref(), Some("English"));
        assert_eq!(tracks[0].kind, TrackKind::Manual);
        assert!(tracks[0].is_translatable);
        assert_eq!(tracks[1].kind, TrackKind::Auto);
        assert!(!tracks[1].is_translatable);
    }

    #[test]
    fn test_falls_back_to_standalone_track_array() {
        let script = r#"window.something = {"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=fr","languageCode":"fr"}],"other":1};"#;

        let tracks = tracks_from_scripts(&scripts(&[script])).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].language_code, "fr");
    }

    #[test]
    fn test_tracks_without_base_url_are_dropped() {
        let script = r#"x = {"captionTracks":[{"languageCode":"en"},{"baseUrl":"","languageCode":"de"}]};"#;
        assert!(tracks_from_scripts(&scripts(&[script])).is_none());
    }

    #[test]
    fn test_no_tracks_in_unrelated_scripts() {
        assert!(tracks_from_scripts(&scripts(&["console.log('hi');"])).is_none());
        assert!(tracks_from_scripts(&[]).is_none());
    }
}
