//! yt-transcriptor - A Rust CLI tool for extracting caption transcripts from YouTube videos
//!
//! This library acquires the plain-text transcript of a video's spoken content from the
//! surfaces a watch page exposes: a rendered transcript panel, caption tracks embedded in
//! inline script state, the captions-list endpoint, and (through an injected observer
//! capability) the page's own captions traffic. No audio is downloaded or transcribed.

pub mod acquire;
pub mod capture;
pub mod cli;
pub mod config;
pub mod decode;
pub mod discovery;
pub mod engine;
pub mod net;
pub mod output;
pub mod page;
pub mod panel;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use discovery::{CaptionTrack, TrackKind};
pub use engine::{ExtractOptions, PollBudgets, TranscriptEngine};
pub use net::{HttpTextFetcher, TextFetcher};
pub use page::{PageSurface, StaticPage, TranscriptRow};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the extractor
#[derive(thiserror::Error, Debug)]
pub enum ExtractorError {
    #[error("no transcript or captions found")]
    NoTranscriptFound,

    #[error("Unsupported URL format: {0}")]
    UnsupportedUrl(String),

    #[error("Could not determine a video id from URL: {0}")]
    MissingVideoId(String),
}
