//! Channel Lexicon - word-frequency analysis over a YouTube channel's transcripts
//!
//! This library resolves a channel handle or URL, lists the channel's most recent videos,
//! retrieves each video's caption transcript and engagement counters, and computes per-video
//! and channel-wide word-frequency tables.

pub mod analysis;
pub mod channel;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod utils;

pub use analysis::{FrequencyEntry, FrequencyTable, TextAnalyzer};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use pipeline::{AggregationEngine, AnalysisSettings};
pub use providers::{ChannelProvider, ProviderError, TranscriptProvider};
pub use report::{AnalysisReport, ItemReport};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Terminal failures of an analysis run
#[derive(thiserror::Error, Debug)]
pub enum LexiconError {
    #[error("Invalid channel identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Channel not found: {0}")]
    EntityNotFound(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
