use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Fallback for pages whose URL does not parse cleanly; an id is always 11 characters.
static VIDEO_ID_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&#]v=([a-zA-Z0-9_-]{11})").expect("video id pattern"));

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Extract the video id from a watch-page URL.
///
/// Prefers the `v` query parameter; falls back to a pattern scan so that URLs
/// mangled by redirects or fragments still resolve.
pub fn video_id(url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url) {
        if let Some((_, id)) = parsed.query_pairs().find(|(key, _)| key == "v") {
            if !id.is_empty() {
                return Some(id.into_owned());
            }
        }
    }

    VIDEO_ID_PARAM
        .captures(url)
        .map(|captures| captures[1].to_string())
}

/// Set a query parameter on a URL, replacing any existing value.
///
/// Falls back to plain string appending when the base does not parse, since
/// caption base URLs scraped out of page state are occasionally relative or
/// otherwise odd.
pub fn append_param(url: &str, key: &str, value: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            let kept: Vec<(String, String)> = parsed
                .query_pairs()
                .filter(|(existing, _)| existing != key)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            let mut pairs = parsed.query_pairs_mut();
            pairs.clear();
            for (k, v) in &kept {
                pairs.append_pair(k, v);
            }
            pairs.append_pair(key, value);
            drop(pairs);

            parsed.to_string()
        }
        Err(_) => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!(
                "{}{}{}={}",
                url,
                separator,
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        }
    }
}

/// Lowercased base language of a locale, e.g. "en-US" -> "en".
pub fn base_language(locale: &str) -> String {
    locale
        .split('-')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Run `operation` up to `max_attempts` times with a fixed delay between
/// attempts, returning the first `Some` it produces.
///
/// This is the single bounded-retry primitive shared by every polling site in
/// the crate; no loop may wait on page or network state without going through
/// an attempt cap like this one.
pub async fn retry<T, F, Fut>(max_attempts: u32, delay: Duration, mut operation: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 0..max_attempts {
        if let Some(value) = operation().await {
            return Some(value);
        }
        if attempt + 1 < max_attempts {
            tokio::time::sleep(delay).await;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_validate_and_normalize_url() {
        assert!(validate_and_normalize_url("https://www.youtube.com/watch?v=abc").is_ok());
        assert!(validate_and_normalize_url("http://example.com").is_ok());
        assert!(validate_and_normalize_url("ftp://example.com").is_err());
        assert!(validate_and_normalize_url("not-a-url").is_err());
    }

    #[test]
    fn test_video_id_from_query_param() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            video_id("https://www.youtube.com/watch?t=42&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_video_id_pattern_fallback() {
        assert_eq!(
            video_id("youtube.com/watch#v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(video_id("https://www.youtube.com/feed/library"), None);
    }

    #[test]
    fn test_append_param_replaces_existing_value() {
        let url = append_param("https://example.com/api?fmt=vtt&lang=en", "fmt", "json3");
        assert!(url.contains("fmt=json3"));
        assert!(url.contains("lang=en"));
        assert!(!url.contains("fmt=vtt"));
    }

    #[test]
    fn test_append_param_falls_back_to_string_append() {
        assert_eq!(append_param("/api/timedtext", "fmt", "vtt"), "/api/timedtext?fmt=vtt");
        assert_eq!(
            append_param("/api/timedtext?v=abc", "fmt", "vtt"),
            "/api/timedtext?v=abc&fmt=vtt"
        );
    }

    #[test]
    fn test_base_language() {
        assert_eq!(base_language("en-US"), "en");
        assert_eq!(base_language("de"), "de");
        assert_eq!(base_language(""), "");
    }

    #[tokio::test]
    async fn test_retry_stops_on_first_success() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let result = retry(5, Duration::from_millis(1), move || async move {
            let seen = calls_ref.fetch_add(1, Ordering::SeqCst) + 1;
            (seen == 2).then_some(seen)
        })
        .await;

        assert_eq!(result, Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_exhausts_attempt_budget() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let result: Option<u32> = retry(3, Duration::from_millis(1), move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            None
        })
        .await;

        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
