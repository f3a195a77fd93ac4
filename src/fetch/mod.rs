//! Per-video retrieval that never aborts a run

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::providers::{ChannelProvider, ItemStats, TranscriptProvider};

/// Transcript text for one video. Empty text means captions were unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub item_id: String,

    /// Language of the caption track used, when one was found
    pub language: Option<String>,

    pub text: String,
}

impl Transcript {
    pub fn unavailable(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            language: None,
            text: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Retrieves transcripts with language fallback
pub struct TranscriptFetcher {
    provider: Arc<dyn TranscriptProvider>,
    preferred_languages: Vec<String>,
}

impl TranscriptFetcher {
    pub fn new(provider: Arc<dyn TranscriptProvider>, preferred_languages: Vec<String>) -> Self {
        Self {
            provider,
            preferred_languages,
        }
    }

    /// Try the preferred languages, then any language. Total failure yields an empty transcript.
    pub async fn fetch(&self, item_id: &str) -> Transcript {
        let fetched = match self.provider.fetch_transcript(item_id, &self.preferred_languages).await {
            Ok(fetched) => Ok(fetched),
            Err(e) if !self.preferred_languages.is_empty() => {
                tracing::debug!(
                    "No {} transcript for {} ({}), trying any language",
                    self.preferred_languages.join("/"),
                    item_id,
                    e
                );
                self.provider.fetch_transcript(item_id, &[]).await
            }
            Err(e) => Err(e),
        };

        match fetched {
            Ok(fetched) => {
                let transcript = Transcript {
                    item_id: item_id.to_string(),
                    language: Some(fetched.language.clone()),
                    text: fetched.text(),
                };
                if transcript.is_empty() {
                    tracing::warn!("Transcript for {} is empty", item_id);
                }
                transcript
            }
            Err(e) => {
                tracing::warn!("Transcript unavailable for {}: {}", item_id, e);
                Transcript::unavailable(item_id)
            }
        }
    }
}

/// Retrieves engagement counters, degrading to unknown on failure
pub struct ItemStatsFetcher {
    provider: Arc<dyn ChannelProvider>,
}

impl ItemStatsFetcher {
    pub fn new(provider: Arc<dyn ChannelProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch(&self, item_id: &str) -> ItemStats {
        match self.provider.item_stats(item_id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Stats unavailable for {}: {}", item_id, e);
                ItemStats::unknown()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        FetchedTranscript, MockChannelProvider, MockTranscriptProvider, ProviderError, TranscriptSegment,
    };
    use mockall::Sequence;

    fn fetched(language: &str, text: &str) -> FetchedTranscript {
        FetchedTranscript {
            language: language.to_string(),
            segments: vec![TranscriptSegment {
                start: 0.0,
                duration: 2.0,
                text: text.to_string(),
            }],
        }
    }

    fn preferred() -> Vec<String> {
        vec!["pt".to_string(), "en".to_string()]
    }

    #[tokio::test]
    async fn test_fetch_preferred_language() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_fetch_transcript()
            .withf(|id, languages| id.to_string() == "v1" && languages.to_vec() == preferred())
            .times(1)
            .returning(|_, _| Ok(fetched("pt", "bom dia")));

        let fetcher = TranscriptFetcher::new(Arc::new(provider), preferred());
        let transcript = fetcher.fetch("v1").await;

        assert_eq!(transcript.text, "bom dia");
        assert_eq!(transcript.language.as_deref(), Some("pt"));
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_any_language() {
        let mut seq = Sequence::new();
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_fetch_transcript()
            .withf(|_, languages| !languages.is_empty())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(anyhow::anyhow!("no pt/en captions")));
        provider
            .expect_fetch_transcript()
            .withf(|_, languages| languages.is_empty())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(fetched("es", "buenos días")));

        let fetcher = TranscriptFetcher::new(Arc::new(provider), preferred());
        let transcript = fetcher.fetch("v1").await;

        assert_eq!(transcript.text, "buenos días");
        assert_eq!(transcript.language.as_deref(), Some("es"));
    }

    #[tokio::test]
    async fn test_fetch_total_failure_is_empty() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_fetch_transcript()
            .times(2)
            .returning(|_, _| Err(anyhow::anyhow!("captions disabled")));

        let fetcher = TranscriptFetcher::new(Arc::new(provider), preferred());
        let transcript = fetcher.fetch("v1").await;

        assert!(transcript.is_empty());
        assert_eq!(transcript, Transcript::unavailable("v1"));
    }

    #[tokio::test]
    async fn test_fetch_without_preferences_tries_once() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_fetch_transcript()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("captions disabled")));

        let fetcher = TranscriptFetcher::new(Arc::new(provider), Vec::new());
        assert!(fetcher.fetch("v1").await.is_empty());
    }

    #[tokio::test]
    async fn test_stats_degrade_to_unknown() {
        let mut provider = MockChannelProvider::new();
        provider
            .expect_item_stats()
            .returning(|_| Err(ProviderError::new(Some(500), "backend error")));

        let fetcher = ItemStatsFetcher::new(Arc::new(provider));
        assert!(fetcher.fetch("v1").await.is_unknown());
    }

    #[tokio::test]
    async fn test_stats_missing_dislikes_stay_unknown() {
        let mut provider = MockChannelProvider::new();
        provider.expect_item_stats().returning(|_| {
            Ok(ItemStats {
                views: Some(10),
                likes: Some(2),
                dislikes: None,
            })
        });

        let fetcher = ItemStatsFetcher::new(Arc::new(provider));
        let stats = fetcher.fetch("v1").await;

        assert_eq!(stats.views, Some(10));
        assert_eq!(stats.dislikes, None);
    }
}
