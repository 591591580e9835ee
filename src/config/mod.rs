use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::PollBudgets;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Extraction behavior and polling budgets
    pub extraction: ExtractionConfig,

    /// HTTP client settings
    pub http: HttpConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Locale used for caption-track selection and translation targets
    pub preferred_language: String,

    /// Prefix segments with start-time clocks by default
    pub include_timestamps: bool,

    /// Embedded-state discovery retries
    pub discovery_attempts: u32,
    pub discovery_delay_ms: u64,

    /// Transcript-panel readiness polls
    pub panel_attempts: u32,
    pub panel_delay_ms: u64,

    /// Network-capture wait window and poll interval
    pub capture_wait_ms: u64,
    pub capture_poll_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default output format
    pub default_output_format: String,

    /// Optional text prepended to --with-title output, e.g. an instruction
    /// for the chat assistant the transcript will be pasted into
    pub prompt_prefix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let budgets = PollBudgets::default();
        Self {
            extraction: ExtractionConfig {
                preferred_language: "en-US".to_string(),
                include_timestamps: false,
                discovery_attempts: budgets.discovery_attempts,
                discovery_delay_ms: budgets.discovery_delay_ms,
                panel_attempts: budgets.panel_attempts,
                panel_delay_ms: budgets.panel_delay_ms,
                capture_wait_ms: budgets.capture_wait_ms,
                capture_poll_ms: budgets.capture_poll_ms,
            },
            http: HttpConfig { timeout_secs: 20 },
            app: AppConfig {
                default_output_format: "text".to_string(),
                prompt_prefix: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content =
                fs_err::read_to_string(&config_path).context("Failed to read config file")?;

            let config: Config =
                serde_yaml::from_str(&content).context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("yt-transcriptor").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.extraction.discovery_attempts == 0 || self.extraction.panel_attempts == 0 {
            anyhow::bail!("Polling attempt counts must be at least 1");
        }

        if self.extraction.capture_poll_ms == 0 {
            anyhow::bail!("Capture poll interval must be non-zero");
        }

        if self.http.timeout_secs == 0 {
            anyhow::bail!("HTTP timeout must be non-zero");
        }

        if !matches!(self.app.default_output_format.as_str(), "text" | "json") {
            anyhow::bail!(
                "Unknown default output format: {}",
                self.app.default_output_format
            );
        }

        Ok(())
    }

    /// The polling budgets this configuration describes
    pub fn poll_budgets(&self) -> PollBudgets {
        PollBudgets {
            discovery_attempts: self.extraction.discovery_attempts,
            discovery_delay_ms: self.extraction.discovery_delay_ms,
            panel_attempts: self.extraction.panel_attempts,
            panel_delay_ms: self.extraction.panel_delay_ms,
            capture_wait_ms: self.extraction.capture_wait_ms,
            capture_poll_ms: self.extraction.capture_poll_ms,
        }
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Preferred Language: {}", self.extraction.preferred_language);
        println!("  Include Timestamps: {}", self.extraction.include_timestamps);
        println!(
            "  Discovery Polling: {} attempts x {} ms",
            self.extraction.discovery_attempts, self.extraction.discovery_delay_ms
        );
        println!(
            "  Panel Polling: {} attempts x {} ms",
            self.extraction.panel_attempts, self.extraction.panel_delay_ms
        );
        println!(
            "  Capture Window: {} ms polled every {} ms",
            self.extraction.capture_wait_ms, self.extraction.capture_poll_ms
        );
        println!("  HTTP Timeout: {} s", self.http.timeout_secs);
        println!("  Default Format: {}", self.app.default_output_format);
        if let Some(prefix) = &self.app.prompt_prefix {
            println!("  Prompt Prefix: {}", prefix);
        }
    }

    /// Interactive configuration setup
    pub async fn interactive_setup(&self) -> Result<()> {
        println!("Interactive configuration setup coming soon!");
        println!("For now, please edit the config file manually:");
        println!("  {}", Self::config_path()?.display());
        Ok(())
    }
}
