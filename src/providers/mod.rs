use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod captions;
pub mod youtube;

use crate::Result;

/// Descriptive metadata about a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// Canonical channel ID
    pub id: String,

    /// Channel title
    pub title: String,

    /// Channel description
    pub description: String,

    /// Subscriber count, if the channel exposes it
    pub subscriber_count: Option<u64>,

    /// Number of public videos, if reported
    pub item_count: Option<u64>,
}

/// A single enumerated video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    /// Video ID
    pub id: String,

    /// Video title
    pub title: String,

    /// Publish timestamp as reported by the provider (RFC 3339)
    pub published_at: String,
}

/// Engagement counters for one video. Every counter may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStats {
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub dislikes: Option<u64>,
}

impl ItemStats {
    /// Stats with every counter unknown
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.views.is_none() && self.likes.is_none() && self.dislikes.is_none()
    }
}

/// One timed caption entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,

    /// Caption text
    pub text: String,
}

/// Caption track returned by a transcript provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedTranscript {
    /// Language code of the track that was used
    pub language: String,

    /// Timed entries in playback order
    pub segments: Vec<TranscriptSegment>,
}

impl FetchedTranscript {
    /// Concatenate the entry texts in order, separated by single spaces
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Structured failure reported by the metadata service
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Provider error{}: {message}", code_suffix(.code))]
pub struct ProviderError {
    /// HTTP or API error code, when one was reported
    pub code: Option<u16>,

    /// Human-readable message; the provider's own message when it could be parsed
    pub message: String,

    /// Unparsed response body or transport error text
    pub raw_detail: Option<String>,
}

impl ProviderError {
    pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            raw_detail: None,
        }
    }

    pub fn with_raw_detail(mut self, raw: impl Into<String>) -> Self {
        self.raw_detail = Some(raw.into());
        self
    }
}

fn code_suffix(code: &Option<u16>) -> String {
    code.map(|code| format!(" ({})", code)).unwrap_or_default()
}

/// Publisher metadata service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelProvider: Send + Sync {
    /// Look up the canonical channel ID bound to a handle (without the leading `@`)
    async fn channel_id_for_handle(&self, handle: &str) -> std::result::Result<Option<String>, ProviderError>;

    /// Fetch channel metadata; `None` when the provider knows no such channel
    async fn channel_info(&self, channel_id: &str) -> std::result::Result<Option<EntityInfo>, ProviderError>;

    /// List the most recent videos of a channel, newest first
    async fn recent_items(&self, channel_id: &str, max_results: u32) -> std::result::Result<Vec<ItemRef>, ProviderError>;

    /// Fetch engagement counters for one video
    async fn item_stats(&self, item_id: &str) -> std::result::Result<ItemStats, ProviderError>;

    /// Get the name of this provider
    fn provider_name(&self) -> &'static str;
}

/// Caption transcript service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch a transcript for a video. `languages` lists acceptable language codes in order of
    /// preference; an empty slice accepts any available language.
    async fn fetch_transcript(&self, item_id: &str, languages: &[String]) -> Result<FetchedTranscript>;

    /// Get the name of this provider
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_text_joins_entries_in_order() {
        let transcript = FetchedTranscript {
            language: "pt".to_string(),
            segments: vec![
                TranscriptSegment { start: 0.0, duration: 1.0, text: "olá ".to_string() },
                TranscriptSegment { start: 1.0, duration: 1.0, text: "\n".to_string() },
                TranscriptSegment { start: 2.0, duration: 1.5, text: "mundo".to_string() },
            ],
        };

        assert_eq!(transcript.text(), "olá mundo");
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new(Some(403), "quota exceeded").with_raw_detail("{}");
        assert_eq!(err.to_string(), "Provider error (403): quota exceeded");

        let err = ProviderError::new(None, "connection reset");
        assert_eq!(err.to_string(), "Provider error: connection reset");
    }

    #[test]
    fn test_item_stats_unknown() {
        assert!(ItemStats::unknown().is_unknown());
        assert!(!ItemStats { views: Some(0), ..Default::default() }.is_unknown());
    }
}
