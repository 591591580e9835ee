//! The page-surface capability and its static-document implementation.
//!
//! Everything that touches third-party DOM structure (selectors, attribute
//! names, label text) lives behind [`PageSurface`] so the extraction tiers
//! never see a selector; when the host page's markup shifts, only this module
//! changes.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::decode::collapse_whitespace;

static SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script").expect("script selector"));

static SEGMENT_ROW: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#segments-container ytd-transcript-segment-renderer").expect("segment row selector")
});
static ROW_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("yt-formatted-string").expect("row text selector"));
static ROW_TIMESTAMP: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".segment-timestamp").expect("row timestamp selector"));

static TITLE_HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#title h1 yt-formatted-string").expect("title heading selector"));
static DOCUMENT_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("title selector"));

static DESCRIPTION_EXPANDER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#description-inline-expander button, #expand").expect("description expander selector")
});
static SHOW_TRANSCRIPT_BUTTON: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"button[aria-label="Show transcript"]"#).expect("show transcript selector")
});
static LABEL_BEARING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("yt-formatted-string").expect("label selector"));
static SHOW_TRANSCRIPT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bshow transcript\b").expect("show transcript label pattern"));

/// Elements that act on click and may wrap a transcript-control label.
const ACTIONABLE_ANCESTORS: [&str; 3] = ["tp-yt-paper-item", "ytd-menu-service-item-renderer", "button"];

/// One rendered transcript-panel row, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRow {
    pub text: String,
    /// The row's own rendered timestamp label, e.g. "1:05".
    pub timestamp: Option<String>,
}

/// Read-only view of the watch page consumed by the acquisition tiers.
pub trait PageSurface: Send + Sync {
    /// URL the page was loaded from; the video id is derived from it.
    fn page_url(&self) -> String;

    /// The video title, when the page exposes one.
    fn page_title(&self) -> Option<String>;

    /// Text of every inline `<script>`, re-read on each call since the page
    /// may still be hydrating while discovery polls.
    fn inline_scripts(&self) -> Vec<String>;

    /// A rendered component's exposed player-response data object, for
    /// surfaces that can reach one. Secondary to script scanning.
    fn player_response_data(&self) -> Option<Value>;

    /// Rendered transcript-panel rows in document order; empty when the panel
    /// is missing or not yet populated.
    fn transcript_rows(&self) -> Vec<TranscriptRow>;

    /// Try to reveal the transcript panel: expand the description area and
    /// activate the "show transcript" control (direct label match, or a label
    /// scan resolved to its nearest actionable ancestor). Returns true when a
    /// control was activated and the panel may now populate asynchronously.
    fn reveal_transcript_panel(&self) -> bool;

    /// Turn the player's caption display on if it is present and off, so the
    /// player issues its own captions request.
    fn enable_captions(&self);
}

/// Page surface over a fetched or saved watch-page HTML document.
///
/// Covers every read operation; the interactive ones (revealing the panel,
/// toggling captions) report absence because a static document cannot be
/// clicked.
pub struct StaticPage {
    url: String,
    html: String,
}

impl StaticPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    // scraper's parsed tree is not Sync, so parse per read instead of caching.
    fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

impl PageSurface for StaticPage {
    fn page_url(&self) -> String {
        self.url.clone()
    }

    fn page_title(&self) -> Option<String> {
        let document = self.document();

        if let Some(heading) = document.select(&TITLE_HEADING).next() {
            let title = collapse_whitespace(&heading.text().collect::<String>());
            if !title.is_empty() {
                return Some(title);
            }
        }

        document
            .select(&DOCUMENT_TITLE)
            .next()
            .map(|node| collapse_whitespace(&node.text().collect::<String>()))
            .map(|title| title.trim_end_matches(" - YouTube").to_string())
            .filter(|title| !title.is_empty())
    }

    fn inline_scripts(&self) -> Vec<String> {
        self.document()
            .select(&SCRIPT)
            .map(|script| script.text().collect::<String>())
            .filter(|text| !text.trim().is_empty())
            .collect()
    }

    fn player_response_data(&self) -> Option<Value> {
        // A static document has no live component tree to read from.
        None
    }

    fn transcript_rows(&self) -> Vec<TranscriptRow> {
        let document = self.document();

        document
            .select(&SEGMENT_ROW)
            .map(|row| {
                let text = row
                    .select(&ROW_TEXT)
                    .next()
                    .map(|node| collapse_whitespace(&node.text().collect::<String>()))
                    .unwrap_or_default();

                let timestamp = row
                    .select(&ROW_TIMESTAMP)
                    .next()
                    .map(|node| collapse_whitespace(&node.text().collect::<String>()))
                    .filter(|label| !label.is_empty());

                TranscriptRow { text, timestamp }
            })
            .collect()
    }

    fn reveal_transcript_panel(&self) -> bool {
        let document = self.document();

        // The interactive sequence is expand-description then activate the
        // control; a static snapshot can only report what is present.
        let expander_present = document.select(&DESCRIPTION_EXPANDER).next().is_some();
        if find_show_transcript_control(&document).is_some() {
            tracing::debug!(
                description_expander = expander_present,
                "show-transcript control present, but a static snapshot cannot activate it"
            );
        }
        false
    }

    fn enable_captions(&self) {}
}

/// Locate the "show transcript" control: a directly labeled button, or any
/// label-bearing element whose text matches, resolved to the nearest
/// actionable ancestor.
pub(crate) fn find_show_transcript_control(document: &Html) -> Option<ElementRef<'_>> {
    if let Some(button) = document.select(&SHOW_TRANSCRIPT_BUTTON).next() {
        return Some(button);
    }

    for label in document.select(&LABEL_BEARING) {
        let text = label.text().collect::<String>();
        if !SHOW_TRANSCRIPT_LABEL.is_match(&text) {
            continue;
        }

        let actionable = label
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|ancestor| ACTIONABLE_ANCESTORS.contains(&ancestor.value().name()));
        return Some(actionable.unwrap_or(label));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCH_PAGE: &str = r#"<!DOCTYPE html>
        <html><head><title>Rust in 100 Seconds - YouTube</title>
        <script>var config = {"unrelated": true};</script>
        <script>var ytInitialPlayerResponse = {"videoDetails":{"title":"Rust in 100 Seconds"}};</script>
        </head><body>
        <div id="title"><h1><yt-formatted-string>Rust in 100 Seconds</yt-formatted-string></h1></div>
        <div id="segments-container">
            <ytd-transcript-segment-renderer>
                <div class="segment-timestamp">0:01</div>
                <yt-formatted-string>hello from the panel</yt-formatted-string>
            </ytd-transcript-segment-renderer>
            <ytd-transcript-segment-renderer>
                <div class="segment-timestamp">0:04</div>
                <yt-formatted-string>second row</yt-formatted-string>
            </ytd-transcript-segment-renderer>
        </div>
        </body></html>"#;

    #[test]
    fn test_reads_transcript_rows_in_document_order() {
        let page = StaticPage::new("https://www.youtube.com/watch?v=abcdefghijk", WATCH_PAGE);
        let rows = page.transcript_rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "hello from the panel");
        assert_eq!(rows[0].timestamp.as_deref(), Some("0:01"));
        assert_eq!(rows[1].text, "second row");
    }

    #[test]
    fn test_reads_inline_scripts() {
        let page = StaticPage::new("https://www.youtube.com/watch?v=abcdefghijk", WATCH_PAGE);
        let scripts = page.inline_scripts();

        assert_eq!(scripts.len(), 2);
        assert!(scripts[1].contains("ytInitialPlayerResponse"));
    }

    #[test]
    fn test_prefers_heading_title_over_document_title() {
        let page = StaticPage::new("https://www.youtube.com/watch?v=abcdefghijk", WATCH_PAGE);
        assert_eq!(page.page_title().as_deref(), Some("Rust in 100 Seconds"));

        let bare = StaticPage::new(
            "https://www.youtube.com/watch?v=abcdefghijk",
            "<html><head><title>Fallback Title - YouTube</title></head><body></body></html>",
        );
        assert_eq!(bare.page_title().as_deref(), Some("Fallback Title"));
    }

    #[test]
    fn test_missing_panel_yields_no_rows() {
        let page = StaticPage::new("https://www.youtube.com/watch?v=abcdefghijk", "<html></html>");
        assert!(page.transcript_rows().is_empty());
        assert!(!page.reveal_transcript_panel());
    }

    #[test]
    fn test_finds_show_transcript_control_by_label() {
        let document = Html::parse_document(
            r#"<html><body>
                <button aria-label="Show transcript">direct</button>
            </body></html>"#,
        );
        assert!(find_show_transcript_control(&document).is_some());

        let document = Html::parse_document(
            r#"<html><body>
                <ytd-menu-service-item-renderer>
                    <tp-yt-paper-item><yt-formatted-string>Show transcript</yt-formatted-string></tp-yt-paper-item>
                </ytd-menu-service-item-renderer>
            </body></html>"#,
        );
        let control = find_show_transcript_control(&document).unwrap();
        assert_eq!(control.value().name(), "tp-yt-paper-item");

        let document = Html::parse_document("<html><body><button>Share</button></body></html>");
        assert!(find_show_transcript_control(&document).is_none());
    }
}
