use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_transcriptor::capture::FixedResourceLog;
use yt_transcriptor::cli::{Cli, Commands};
use yt_transcriptor::config::Config;
use yt_transcriptor::discovery::choose_best_track;
use yt_transcriptor::engine::{ExtractOptions, TranscriptEngine};
use yt_transcriptor::net::{HttpTextFetcher, TextFetcher};
use yt_transcriptor::output::{self, ExtractionRecord};
use yt_transcriptor::page::{PageSurface, StaticPage};
use yt_transcriptor::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "yt_transcriptor=debug,yt_transcript=debug"
    } else {
        "yt_transcriptor=info,yt_transcript=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Extract {
            url,
            output,
            format,
            timestamps,
            language,
            with_title,
            no_capture,
            captured_urls,
        } => {
            let url = utils::validate_and_normalize_url(&url)?;
            let fetcher = Arc::new(HttpTextFetcher::new(Duration::from_secs(
                config.http.timeout_secs,
            ))?);

            let options = ExtractOptions {
                include_timestamps: timestamps || config.extraction.include_timestamps,
                locale: language.unwrap_or_else(|| config.extraction.preferred_language.clone()),
                capture_enabled: !no_capture,
                budgets: config.poll_budgets(),
            };

            let spinner = progress_spinner(cli.quiet);
            spinner.set_message("Fetching watch page...");

            tracing::info!("Starting extraction for URL: {}", url);
            let html = fetcher.fetch_text(&url).await?;
            let page = StaticPage::new(url.clone(), html);
            let title = page.page_title();

            let mut engine =
                TranscriptEngine::new(Box::new(page), fetcher.clone(), options);
            if let Some(path) = &captured_urls {
                engine = engine.with_resource_log(Box::new(read_captured_urls(path)?));
            }

            spinner.set_message("Extracting transcript...");
            let extracted = engine.extract().await;
            spinner.finish_and_clear();
            let transcript = extracted?;

            let record = ExtractionRecord {
                video_id: utils::video_id(&url),
                url,
                title,
                transcript,
                extracted_at: chrono::Utc::now(),
            };

            let prompt_prefix = config.app.prompt_prefix.as_deref().filter(|_| with_title);
            match output {
                Some(path) => {
                    output::save_to_file(&record, &path, &format, prompt_prefix, with_title).await?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&record, &format, prompt_prefix, with_title)?;
                }
            }
        }
        Commands::Tracks { url, language } => {
            let url = utils::validate_and_normalize_url(&url)?;
            let fetcher = Arc::new(HttpTextFetcher::new(Duration::from_secs(
                config.http.timeout_secs,
            ))?);
            let locale = language.unwrap_or_else(|| config.extraction.preferred_language.clone());

            let options = ExtractOptions {
                locale: locale.clone(),
                budgets: config.poll_budgets(),
                ..ExtractOptions::default()
            };

            tracing::info!("Listing caption tracks for URL: {}", url);
            let html = fetcher.fetch_text(&url).await?;
            let page = StaticPage::new(url, html);
            let engine =
                TranscriptEngine::new(Box::new(page), fetcher.clone(), options);

            let tracks = engine.discover().await;
            if tracks.is_empty() {
                println!("No caption tracks found.");
            } else {
                let selected = choose_best_track(&tracks, &locale).map(|track| track.base_url.clone());

                println!("Available caption tracks:");
                for track in &tracks {
                    let marker = if selected.as_deref() == Some(track.base_url.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    let name = track.name.as_deref().unwrap_or("-");
                    let translatable = if track.is_translatable { ", translatable" } else { "" };
                    println!(
                        "  {} {} ({}{}) {}",
                        marker,
                        track.language_code,
                        track.kind.label(),
                        translatable,
                        name
                    );
                }
                println!("\n  * = track the selector would use for locale {}", locale);
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                config.interactive_setup().await?;
            }
        }
    }

    Ok(())
}

fn progress_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn read_captured_urls(path: &Path) -> Result<FixedResourceLog> {
    let content = fs_err::read_to_string(path)?;
    let urls = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    Ok(FixedResourceLog::new(urls))
}
