use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::analysis::StopwordLanguage;

#[derive(Parser)]
#[command(
    name = "lexicon",
    about = "Channel Lexicon - Most used words across a YouTube channel's recent videos",
    version,
    long_about = "Resolves a YouTube channel from its @handle or channel URL, fetches the captions of its most recent videos, and reports the most frequent words per video and for the whole channel."
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
    /// Analyze the word frequencies of a channel's recent videos
    Analyze {
        /// Channel URL or handle (e.g. https://www.youtube.com/@channel or .../channel/UC...)
        #[arg(value_name = "CHANNEL")]
        channel: String,

        /// Number of most used words to list (1-100)
        #[arg(short = 'n', long, value_name = "COUNT", value_parser = clap::value_parser!(u16).range(1..=100))]
        top_n: Option<u16>,

        /// Number of recent videos to analyze (1-20)
        #[arg(short, long, value_name = "COUNT", value_parser = clap::value_parser!(u32).range(1..=20))]
        max_results: Option<u32>,

        /// Stopword language
        #[arg(short, long, value_enum)]
        language: Option<StopwordLanguage>,

        /// Preferred caption languages, in order (comma separated)
        #[arg(short, long, value_name = "LANGS", value_delimiter = ',')]
        captions: Option<Vec<String>>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// YouTube Data API key
        #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Number of videos fetched at the same time
        #[arg(long, value_name = "COUNT", value_parser = clap::value_parser!(u16).range(1..=16))]
        concurrency: Option<u16>,
    },

    /// Show or locate the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List the stopwords filtered for a language
    Stopwords {
        /// Stopword language
        #[arg(short, long, value_enum, default_value = "portuguese")]
        language: StopwordLanguage,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with every table
    Json,
    /// CSV, one row per word
    Csv,
    /// Markdown document
    Markdown,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Markdown => "md",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}
