use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::Result;

/// Desktop-browser User-Agent; the captions endpoints serve different (and
/// sometimes empty) bodies to clients that look like bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Trait for fetching text bodies over HTTP.
///
/// The acquisition tiers depend on this seam rather than on a concrete client,
/// so tests can script exact fetch sequences and failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextFetcher: Send + Sync {
    /// Fetch a URL and return its body as text; non-2xx statuses are errors.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher used by the CLI.
pub struct HttpTextFetcher {
    client: Client,
}

impl HttpTextFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl TextFetcher for HttpTextFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {} for {}", response.status(), url);
        }

        Ok(response.text().await?)
    }
}
