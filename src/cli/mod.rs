use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-transcript",
    about = "Extract caption transcripts from YouTube videos without downloading any audio",
    version,
    long_about = "A CLI tool that pulls the transcript of a YouTube video out of the surfaces the \
watch page already exposes: the rendered transcript panel, caption tracks embedded in page state, \
and the captions endpoints. Nothing is downloaded or transcribed; if the video has no captions, \
there is no transcript to extract."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the transcript of a video
    Extract {
        /// Watch-page URL of the video
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Prefix each segment with its start-time clock, e.g. [1:05]
        #[arg(long)]
        timestamps: bool,

        /// Locale used for caption-track selection and translation requests
        /// (defaults to the configured preferred language)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Prepend the video title (and the configured prompt prefix, if any)
        /// to text output
        #[arg(long)]
        with_title: bool,

        /// Skip the network-capture fallback tier
        #[arg(long)]
        no_capture: bool,

        /// File with one observed request URL per line, fed to the capture
        /// tier as a recorded resource log
        #[arg(long, value_name = "FILE")]
        captured_urls: Option<PathBuf>,
    },

    /// List the caption tracks available for a video
    Tracks {
        /// Watch-page URL of the video
        #[arg(value_name = "URL")]
        url: String,

        /// Locale used to mark which track would be selected
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON envelope with extraction metadata
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
