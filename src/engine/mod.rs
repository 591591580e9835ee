//! The acquisition orchestrator.
//!
//! Tiers run in a fixed order (transcript panel, structured caption
//! pipeline, network capture) and the first non-empty result wins. A tier
//! failing is never an error; only exhausting every tier surfaces the
//! terminal "no transcript or captions found" outcome.

use std::sync::Arc;
use std::time::Duration;

use crate::capture::{self, FixedResourceLog, NoopObserver, RequestObserver, ResourceLog};
use crate::discovery::{self, CaptionTrack};
use crate::net::TextFetcher;
use crate::page::PageSurface;
use crate::{acquire, panel, ExtractorError, Result};

/// Attempt caps and delays for every polling site; each loop in the engine is
/// bounded by one of these so no tier can hang.
#[derive(Debug, Clone)]
pub struct PollBudgets {
    /// Embedded-state discovery passes.
    pub discovery_attempts: u32,
    pub discovery_delay_ms: u64,

    /// Transcript-panel readiness polls after the panel is revealed.
    pub panel_attempts: u32,
    pub panel_delay_ms: u64,

    /// Wall-clock window and poll interval for the network-capture wait.
    pub capture_wait_ms: u64,
    pub capture_poll_ms: u64,
}

impl Default for PollBudgets {
    fn default() -> Self {
        Self {
            discovery_attempts: 12,
            discovery_delay_ms: 500,
            panel_attempts: 10,
            panel_delay_ms: 500,
            capture_wait_ms: 5000,
            capture_poll_ms: 200,
        }
    }
}

impl PollBudgets {
    pub fn discovery_delay(&self) -> Duration {
        Duration::from_millis(self.discovery_delay_ms)
    }

    pub fn panel_delay(&self) -> Duration {
        Duration::from_millis(self.panel_delay_ms)
    }

    pub fn capture_wait(&self) -> Duration {
        Duration::from_millis(self.capture_wait_ms)
    }

    pub fn capture_poll(&self) -> Duration {
        Duration::from_millis(self.capture_poll_ms)
    }
}

/// Per-extraction options supplied by the caller.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Prefix each segment with a clock rendering of its start time.
    pub include_timestamps: bool,

    /// Caller's locale, used for track scoring and translation targets.
    pub locale: String,

    /// Whether the network-capture tier runs at all. Surfaces with no
    /// observer and no resource log would only wait out the capture window.
    pub capture_enabled: bool,

    pub budgets: PollBudgets,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_timestamps: false,
            locale: "en-US".to_string(),
            capture_enabled: true,
            budgets: PollBudgets::default(),
        }
    }
}

/// Sequences the acquisition tiers over one page.
pub struct TranscriptEngine {
    page: Box<dyn PageSurface>,
    fetcher: Arc<dyn TextFetcher>,
    observer: Box<dyn RequestObserver>,
    resource_log: Box<dyn ResourceLog>,
    options: ExtractOptions,
}

impl TranscriptEngine {
    pub fn new(page: Box<dyn PageSurface>, fetcher: Arc<dyn TextFetcher>, options: ExtractOptions) -> Self {
        Self {
            page,
            fetcher,
            observer: Box::new(NoopObserver),
            resource_log: Box::new(FixedResourceLog::empty()),
            options,
        }
    }

    /// Replace the request-observer capability used by the capture tier.
    pub fn with_observer(mut self, observer: Box<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the resource-log capability used by the capture tier.
    pub fn with_resource_log(mut self, resource_log: Box<dyn ResourceLog>) -> Self {
        self.resource_log = resource_log;
        self
    }

    /// Run the fallback chain and return the first non-empty transcript.
    pub async fn extract(&self) -> Result<String> {
        let include_timestamps = self.options.include_timestamps;

        if let Some(text) =
            panel::scrape_transcript(self.page.as_ref(), include_timestamps, &self.options.budgets).await
        {
            tracing::info!("transcript read from the rendered panel");
            return Ok(text);
        }

        tracing::info!("transcript panel unavailable; trying caption tracks");
        let tracks = self.discover().await;
        if tracks.is_empty() {
            tracing::info!("no caption tracks discovered");
        } else if let Some(track) = discovery::choose_best_track(&tracks, &self.options.locale) {
            tracing::info!(
                language = %track.language_code,
                kind = track.kind.label(),
                "selected caption track"
            );

            if let Some(text) = acquire::fetch_transcript(
                self.fetcher.as_ref(),
                track,
                &self.options.locale,
                include_timestamps,
            )
            .await
            {
                return Ok(text);
            }
            tracing::info!("selected track yielded no decodable captions");
        }

        if self.options.capture_enabled {
            tracing::info!("structured caption pipeline empty; watching captions traffic");
            self.page.enable_captions();

            if let Some(text) = capture::capture_transcript(
                self.observer.as_ref(),
                self.resource_log.as_ref(),
                self.fetcher.as_ref(),
                include_timestamps,
                &self.options.budgets,
            )
            .await
            {
                tracing::info!("transcript recovered from captured captions traffic");
                return Ok(text);
            }
        }

        Err(ExtractorError::NoTranscriptFound.into())
    }

    /// Discovery and selection only, for diagnostics like the `tracks` command.
    pub async fn discover(&self) -> Vec<CaptionTrack> {
        discovery::discover_tracks(self.page.as_ref(), self.fetcher.as_ref(), &self.options.budgets).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::MockTextFetcher;
    use crate::page::StaticPage;

    fn fast_options() -> ExtractOptions {
        ExtractOptions {
            budgets: PollBudgets {
                discovery_attempts: 1,
                discovery_delay_ms: 1,
                panel_attempts: 1,
                panel_delay_ms: 1,
                capture_wait_ms: 10,
                capture_poll_ms: 2,
            },
            ..ExtractOptions::default()
        }
    }

    const PANEL_PAGE: &str = r#"<html><body><div id="segments-container">
        <ytd-transcript-segment-renderer>
            <div class="segment-timestamp">0:00</div>
            <yt-formatted-string>panel wins</yt-formatted-string>
        </ytd-transcript-segment-renderer>
    </div></body></html>"#;

    const TRACK_PAGE: &str = r#"<html><head><script>
        var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[
            {"baseUrl":"https://www.youtube.com/api/timedtext?v=abcdefghijk&lang=en","languageCode":"en"}
        ]}}};
    </script></head><body></body></html>"#;

    #[tokio::test]
    async fn test_panel_success_short_circuits_all_network_tiers() {
        let page = StaticPage::new("https://www.youtube.com/watch?v=abcdefghijk", PANEL_PAGE);
        // No expectations: any fetch at all fails the test.
        let fetcher = MockTextFetcher::new();

        let engine = TranscriptEngine::new(Box::new(page), Arc::new(fetcher), fast_options());
        let text = engine.extract().await.unwrap();

        assert_eq!(text, "panel wins");
    }

    #[tokio::test]
    async fn test_embedded_tracks_feed_the_acquirer() {
        let page = StaticPage::new("https://www.youtube.com/watch?v=abcdefghijk", TRACK_PAGE);

        let mut fetcher = MockTextFetcher::new();
        fetcher
            .expect_fetch_text()
            .withf(|url| url.contains("fmt=json3"))
            .times(1)
            .returning(|_| {
                Ok(r#"{"events":[{"tStartMs":0,"segs":[{"utf8":"from tracks"}]}]}"#.to_string())
            });

        let engine = TranscriptEngine::new(Box::new(page), Arc::new(fetcher), fast_options());
        let text = engine.extract().await.unwrap();

        assert_eq!(text, "from tracks");
    }

    #[tokio::test]
    async fn test_exhausted_tiers_report_the_terminal_outcome() {
        let page = StaticPage::new("https://www.youtube.com/watch?v=abcdefghijk", "<html></html>");

        // Discovery falls back to the list endpoint, which 404s; every caption
        // format request would too, but none are made without tracks.
        let mut fetcher = MockTextFetcher::new();
        fetcher
            .expect_fetch_text()
            .withf(|url| url.contains("type=list"))
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("HTTP 404")));

        let engine = TranscriptEngine::new(Box::new(page), Arc::new(fetcher), fast_options());
        let err = engine.extract().await.unwrap_err();

        let extractor_err = err.downcast::<ExtractorError>().unwrap();
        assert!(matches!(extractor_err, ExtractorError::NoTranscriptFound));
        assert_eq!(extractor_err.to_string(), "no transcript or captions found");
    }

    #[tokio::test]
    async fn test_capture_tier_is_the_last_resort() {
        let page = StaticPage::new("https://www.youtube.com/watch?v=abcdefghijk", "<html></html>");

        let mut fetcher = MockTextFetcher::new();
        fetcher
            .expect_fetch_text()
            .withf(|url| url.contains("type=list"))
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("HTTP 404")));
        fetcher
            .expect_fetch_text()
            .withf(|url| url.contains("/api/timedtext") && url.contains("lang=en"))
            .times(1)
            .returning(|_| {
                Ok("WEBVTT\n\n00:00:01.000 --> 00:00:02.000\ncaptured text\n".to_string())
            });

        let log = FixedResourceLog::new(vec![
            "https://www.youtube.com/api/timedtext?v=abcdefghijk&lang=en".to_string(),
        ]);

        let engine = TranscriptEngine::new(Box::new(page), Arc::new(fetcher), fast_options())
            .with_resource_log(Box::new(log));
        let text = engine.extract().await.unwrap();

        assert_eq!(text, "captured text");
    }
}
