use futures_util::{stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

use crate::analysis::{FrequencyTable, StopwordLanguage, TextAnalyzer};
use crate::channel::{IdentifierResolver, ItemEnumerator};
use crate::config::Config;
use crate::fetch::{ItemStatsFetcher, TranscriptFetcher};
use crate::providers::captions::YtDlpCaptions;
use crate::providers::youtube::YoutubeDataApi;
use crate::providers::{ChannelProvider, ItemRef, TranscriptProvider};
use crate::report::{AnalysisReport, ItemReport};
use crate::Result;

/// Parameters for one analysis run, already validated
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub top_n: usize,
    pub max_results: u32,
    pub preferred_languages: Vec<String>,
    pub stopword_language: StopwordLanguage,
    pub concurrency: usize,
    pub show_progress: bool,
}

impl AnalysisSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_n: config.analysis.top_n,
            max_results: config.analysis.max_results,
            preferred_languages: config.captions.preferred_languages.clone(),
            stopword_language: config.analysis.language,
            concurrency: config.app.max_concurrent_fetches,
            show_progress: true,
        }
    }
}

/// Transcript texts in enumeration order, one segment per video
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Corpus {
    segments: Vec<String>,
}

impl Corpus {
    /// Append a transcript; empty ones are skipped
    pub fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.trim().is_empty() {
            self.segments.push(text);
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

/// Drives a full channel analysis
pub struct AggregationEngine {
    resolver: IdentifierResolver,
    enumerator: ItemEnumerator,
    transcripts: TranscriptFetcher,
    stats: ItemStatsFetcher,
    analyzer: TextAnalyzer,
    concurrency: usize,
    show_progress: bool,
}

impl AggregationEngine {
    pub fn new(
        channel_provider: Arc<dyn ChannelProvider>,
        transcript_provider: Arc<dyn TranscriptProvider>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            resolver: IdentifierResolver::new(channel_provider.clone()),
            enumerator: ItemEnumerator::new(channel_provider.clone(), settings.max_results),
            transcripts: TranscriptFetcher::new(transcript_provider, settings.preferred_languages),
            stats: ItemStatsFetcher::new(channel_provider),
            analyzer: TextAnalyzer::for_language(settings.stopword_language, settings.top_n),
            concurrency: settings.concurrency.max(1),
            show_progress: settings.show_progress,
        }
    }

    /// Build an engine talking to the YouTube Data API and yt-dlp
    pub fn from_config(config: &Config, api_key: String, settings: AnalysisSettings) -> Self {
        let channel_provider = Arc::new(YoutubeDataApi::with_base_url(api_key, config.youtube.base_url.clone()));
        let transcript_provider = Arc::new(YtDlpCaptions::with_path(config.captions.yt_dlp_path.clone()));

        Self::new(channel_provider, transcript_provider, settings)
    }

    /// Analyze a channel. Resolution and enumeration failures end the run; per-video
    /// failures only degrade that video's record.
    pub async fn run(&self, identifier: &str) -> Result<AnalysisReport> {
        tracing::info!("Starting analysis for channel: {}", identifier);

        let resolved = self.resolver.resolve(identifier).await?;
        let items = self.enumerator.enumerate(&resolved.id).await?;

        let progress = self.progress_bar(items.len() as u64);
        let analyzed: Vec<(ItemReport, String)> = stream::iter(items)
            .map(|item| self.process_item(item))
            .buffered(self.concurrency)
            .inspect(|(report, _)| {
                progress.set_message(report.item.title.clone());
                progress.inc(1);
            })
            .collect()
            .await;
        progress.finish_and_clear();

        let mut corpus = Corpus::default();
        let mut reports = Vec::with_capacity(analyzed.len());
        for (report, text) in analyzed {
            corpus.push(text);
            reports.push(report);
        }

        let aggregate = self.analyzer.analyze_segments(corpus.segments());
        if aggregate.is_empty() {
            tracing::warn!("No words to aggregate for channel {}", resolved.id);
        } else {
            tracing::info!(
                "Aggregated {} words from {} of {} transcript(s)",
                aggregate.total_tokens,
                corpus.len(),
                reports.len()
            );
        }

        Ok(AnalysisReport {
            entity_id: resolved.id,
            entity: resolved.info,
            items: reports,
            aggregate,
        })
    }

    /// Fetch and analyze one video, returning its record and transcript text
    async fn process_item(&self, item: ItemRef) -> (ItemReport, String) {
        tracing::debug!("Processing video {} ({})", item.id, item.title);

        let (transcript, stats) = tokio::join!(self.transcripts.fetch(&item.id), self.stats.fetch(&item.id));

        let transcript_present = !transcript.is_empty();
        let table = if transcript_present {
            self.analyzer.analyze(&transcript.text)
        } else {
            FrequencyTable::default()
        };

        let report = ItemReport {
            item,
            stats,
            transcript_present,
            transcript_language: transcript.language.filter(|_| transcript_present),
            table,
        };

        (report, transcript.text)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress
    }
}
