//! Last-resort network capture of the page's own captions traffic.
//!
//! When structured discovery finds nothing, the player itself may still fetch
//! captions once its caption display is on. Two redundant signal sources feed
//! one per-extraction session: a [`RequestObserver`] installed into the
//! page's execution context that reports outgoing request URLs over a one-way
//! channel, and a [`ResourceLog`] snapshot of requests that were already
//! issued before the observer was in place. Observation never alters the
//! traffic itself.

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::decode;
use crate::engine::PollBudgets;
use crate::net::TextFetcher;
use crate::Result;

/// Path fragment identifying captions-endpoint requests.
pub const TIMEDTEXT_PATH: &str = "/api/timedtext";

/// Observer capability over the page's outgoing requests.
///
/// Implementations must be pure pass-throughs: every observed call is
/// forwarded unmodified, and only the URL is reported. `install` must be
/// idempotent per page lifetime; installing twice would compound whatever
/// wrapping the implementation does.
#[cfg_attr(test, mockall::automock)]
pub trait RequestObserver: Send + Sync {
    /// Install the observer (if not already installed) and return the channel
    /// on which observed request URLs arrive.
    fn install(&self) -> Result<mpsc::UnboundedReceiver<String>>;
}

/// Point-in-time view of request URLs the page has already issued, e.g. a
/// resource-timing buffer. Re-read on every poll so late entries surface.
#[cfg_attr(test, mockall::automock)]
pub trait ResourceLog: Send + Sync {
    fn snapshot(&self) -> Vec<String>;
}

/// Observer for surfaces with no execution context to hook; reports nothing.
pub struct NoopObserver;

impl RequestObserver for NoopObserver {
    fn install(&self) -> Result<mpsc::UnboundedReceiver<String>> {
        // Sender dropped immediately; the receiver just reports disconnected.
        let (_, receiver) = mpsc::unbounded_channel();
        Ok(receiver)
    }
}

/// Resource log backed by a fixed list of URLs, e.g. read from a file of
/// requests recorded in browser developer tools.
pub struct FixedResourceLog {
    urls: Vec<String>,
}

impl FixedResourceLog {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }

    pub fn empty() -> Self {
        Self { urls: Vec::new() }
    }
}

impl ResourceLog for FixedResourceLog {
    fn snapshot(&self) -> Vec<String> {
        self.urls.clone()
    }
}

/// One extraction's worth of captured captions URLs.
///
/// Created fresh per extraction attempt and discarded afterwards; the set is
/// append-only while the session lives and nothing else reads it.
pub struct CaptureSession<'a> {
    hook: mpsc::UnboundedReceiver<String>,
    log: &'a dyn ResourceLog,
    seen: BTreeSet<String>,
}

impl<'a> CaptureSession<'a> {
    pub fn begin(observer: &dyn RequestObserver, log: &'a dyn ResourceLog) -> Result<Self> {
        Ok(Self {
            hook: observer.install()?,
            log,
            seen: BTreeSet::new(),
        })
    }

    /// Pull everything currently available from both sources into the set.
    fn absorb(&mut self) {
        while let Ok(url) = self.hook.try_recv() {
            self.note(url);
        }
        for url in self.log.snapshot() {
            self.note(url);
        }
    }

    fn note(&mut self, url: String) {
        if url.contains(TIMEDTEXT_PATH) {
            self.seen.insert(url);
        }
    }

    /// Poll both sources until at least one captions URL is captured or the
    /// wall-clock budget elapses. Returns the captured URLs with ones
    /// requesting the event-stream JSON format first.
    pub async fn wait_for_urls(&mut self, wait: Duration, poll: Duration) -> Vec<String> {
        let deadline = Instant::now() + wait;

        loop {
            self.absorb();
            if !self.seen.is_empty() || Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(poll).await;
        }

        let mut urls: Vec<String> = self.seen.iter().cloned().collect();
        // Stable sort: json3 first, set order otherwise.
        urls.sort_by_key(|url| !url.contains("json3"));
        urls
    }
}

/// Run the capture tier: wait for the player's own captions request, then
/// feed each captured URL through fetch and the sniffing decoder.
pub async fn capture_transcript(
    observer: &dyn RequestObserver,
    log: &dyn ResourceLog,
    fetcher: &dyn TextFetcher,
    include_timestamps: bool,
    budgets: &PollBudgets,
) -> Option<String> {
    let mut session = match CaptureSession::begin(observer, log) {
        Ok(session) => session,
        Err(err) => {
            tracing::debug!("request observer unavailable: {err:#}");
            return None;
        }
    };

    let urls = session
        .wait_for_urls(budgets.capture_wait(), budgets.capture_poll())
        .await;
    if urls.is_empty() {
        tracing::debug!("no captions traffic observed within the capture window");
        return None;
    }

    tracing::debug!(count = urls.len(), "observed captions request URLs");
    for url in urls {
        let raw = match fetcher.fetch_text(&url).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!("captured URL failed to fetch: {err:#}");
                continue;
            }
        };

        let text = decode::decode_for_url(&url, &raw, include_timestamps);
        if !text.trim().is_empty() {
            return Some(text);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::MockTextFetcher;

    fn budgets() -> PollBudgets {
        PollBudgets {
            capture_wait_ms: 50,
            capture_poll_ms: 5,
            ..PollBudgets::default()
        }
    }

    struct ChannelObserver {
        urls: Vec<String>,
    }

    impl RequestObserver for ChannelObserver {
        fn install(&self) -> Result<mpsc::UnboundedReceiver<String>> {
            let (sender, receiver) = mpsc::unbounded_channel();
            for url in &self.urls {
                sender.send(url.clone()).expect("receiver alive");
            }
            Ok(receiver)
        }
    }

    #[tokio::test]
    async fn test_session_dedupes_and_prefers_json3() {
        let observer = ChannelObserver {
            urls: vec![
                "https://www.youtube.com/api/timedtext?v=abc&fmt=vtt".to_string(),
                "https://www.youtube.com/api/timedtext?v=abc&fmt=vtt".to_string(),
                "https://www.youtube.com/api/timedtext?v=abc&fmt=json3".to_string(),
                "https://www.youtube.com/watch?v=abc".to_string(),
            ],
        };
        let log = FixedResourceLog::empty();

        let mut session = CaptureSession::begin(&observer, &log).unwrap();
        let urls = session
            .wait_for_urls(Duration::from_millis(50), Duration::from_millis(5))
            .await;

        assert_eq!(urls.len(), 2);
        assert!(urls[0].contains("fmt=json3"));
    }

    #[tokio::test]
    async fn test_resource_log_is_a_redundant_source() {
        let log = FixedResourceLog::new(vec![
            "https://www.youtube.com/api/timedtext?v=abc&lang=en".to_string(),
        ]);

        let mut session = CaptureSession::begin(&NoopObserver, &log).unwrap();
        let urls = session
            .wait_for_urls(Duration::from_millis(50), Duration::from_millis(5))
            .await;

        assert_eq!(urls.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_sources_time_out_to_no_result() {
        let log = FixedResourceLog::empty();
        let fetcher = MockTextFetcher::new();

        let text = capture_transcript(&NoopObserver, &log, &fetcher, false, &budgets()).await;
        assert_eq!(text, None);
    }

    #[tokio::test]
    async fn test_captured_url_decodes_through_sniffing() {
        let observer = ChannelObserver {
            urls: vec!["https://www.youtube.com/api/timedtext?v=abc&fmt=json3".to_string()],
        };
        let log = FixedResourceLog::empty();

        let mut fetcher = MockTextFetcher::new();
        fetcher.expect_fetch_text().times(1).returning(|_| {
            Ok(r#"{"events":[{"tStartMs":0,"segs":[{"utf8":"captured"}]}]}"#.to_string())
        });

        let text = capture_transcript(&observer, &log, &fetcher, false, &budgets()).await;
        assert_eq!(text.as_deref(), Some("captured"));
    }
}
