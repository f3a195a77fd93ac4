//! Channel identifier parsing, resolution and video enumeration

use anyhow::Context;
use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::providers::{ChannelProvider, EntityInfo, ItemRef};
use crate::{LexiconError, Result};

/// Upper bound on videos per run accepted by the search endpoint
pub const MAX_RESULTS_LIMIT: u32 = 20;

/// The recognized shapes of a channel identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelIdentifier {
    /// `@handle`, with the marker stripped
    Handle(String),
    /// Channel ID taken from a `channel/<id>` path
    ChannelId(String),
}

fn handle_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"@([\w-]+)").expect("handle pattern is valid"))
}

fn channel_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"channel/([a-zA-Z0-9_-]+)").expect("channel id pattern is valid"))
}

impl ChannelIdentifier {
    /// Parse a handle or channel URL. Handles win over channel paths.
    pub fn parse(input: &str) -> std::result::Result<Self, LexiconError> {
        let input = input.trim();
        // Browsers percent-encode non-ASCII handles when copying the URL
        let decoded = urlencoding::decode(input)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| input.to_string());

        if let Some(captures) = handle_pattern().captures(&decoded) {
            return Ok(ChannelIdentifier::Handle(captures[1].to_string()));
        }

        if let Some(captures) = channel_id_pattern().captures(&decoded) {
            return Ok(ChannelIdentifier::ChannelId(captures[1].to_string()));
        }

        Err(LexiconError::InvalidIdentifier(input.to_string()))
    }
}

impl std::fmt::Display for ChannelIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelIdentifier::Handle(handle) => write!(f, "@{}", handle),
            ChannelIdentifier::ChannelId(id) => write!(f, "channel/{}", id),
        }
    }
}

/// A channel ID plus whatever metadata could be fetched for it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChannel {
    pub id: String,
    pub info: Option<EntityInfo>,
}

/// Turns a raw identifier into a canonical channel ID
pub struct IdentifierResolver {
    provider: Arc<dyn ChannelProvider>,
}

impl IdentifierResolver {
    pub fn new(provider: Arc<dyn ChannelProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a raw identifier. Metadata lookup is best-effort; the channel ID is not.
    pub async fn resolve(&self, input: &str) -> Result<ResolvedChannel> {
        let identifier = ChannelIdentifier::parse(input)?;
        self.resolve_identifier(&identifier).await
    }

    pub async fn resolve_identifier(&self, identifier: &ChannelIdentifier) -> Result<ResolvedChannel> {
        let id = match identifier {
            ChannelIdentifier::Handle(handle) => {
                tracing::debug!("Resolving handle @{} via {}", handle, self.provider.provider_name());
                self.provider
                    .channel_id_for_handle(handle)
                    .await
                    .map_err(LexiconError::Provider)
                    .with_context(|| format!("Could not resolve handle @{}", handle))?
                    .ok_or_else(|| LexiconError::EntityNotFound(format!("@{}", handle)))?
            }
            ChannelIdentifier::ChannelId(id) => id.clone(),
        };

        let info = match self.provider.channel_info(&id).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!("Could not load channel metadata for {}: {}", id, e);
                None
            }
        };

        tracing::info!("Resolved {} to channel {}", identifier, id);
        Ok(ResolvedChannel { id, info })
    }
}

/// Lists a channel's most recent videos
pub struct ItemEnumerator {
    provider: Arc<dyn ChannelProvider>,
    max_results: u32,
}

impl ItemEnumerator {
    pub fn new(provider: Arc<dyn ChannelProvider>, max_results: u32) -> Self {
        let clamped = max_results.clamp(1, MAX_RESULTS_LIMIT);
        if clamped != max_results {
            tracing::warn!("Max results clamped from {} to {}", max_results, clamped);
        }

        Self {
            provider,
            max_results: clamped,
        }
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// Newest-first videos of the channel. An empty list is a valid answer.
    pub async fn enumerate(&self, channel_id: &str) -> Result<Vec<ItemRef>> {
        let mut items = self
            .provider
            .recent_items(channel_id, self.max_results)
            .await
            .map_err(LexiconError::Provider)
            .with_context(|| format!("Could not list videos for channel {}", channel_id))?;

        items.truncate(self.max_results as usize);
        tracing::info!("Found {} video(s) for channel {}", items.len(), channel_id);

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockChannelProvider, ProviderError};
    use mockall::predicate::eq;

    fn info(id: &str) -> EntityInfo {
        EntityInfo {
            id: id.to_string(),
            title: "Canal".to_string(),
            description: "Descrição".to_string(),
            subscriber_count: Some(1200),
            item_count: None,
        }
    }

    fn item(id: &str) -> ItemRef {
        ItemRef {
            id: id.to_string(),
            title: format!("Video {}", id),
            published_at: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_parse_handle_url() {
        assert_eq!(
            ChannelIdentifier::parse("https://www.youtube.com/@canaltragicomico/").unwrap(),
            ChannelIdentifier::Handle("canaltragicomico".to_string())
        );
        assert_eq!(
            ChannelIdentifier::parse("@some_channel-1").unwrap(),
            ChannelIdentifier::Handle("some_channel-1".to_string())
        );
    }

    #[test]
    fn test_parse_percent_encoded_handle() {
        assert_eq!(
            ChannelIdentifier::parse("https://www.youtube.com/@can%C3%A3o").unwrap(),
            ChannelIdentifier::Handle("canão".to_string())
        );
    }

    #[test]
    fn test_parse_channel_id_url() {
        assert_eq!(
            ChannelIdentifier::parse("https://www.youtube.com/channel/UC_x5XG1OV2P6uZZ5FSM9Ttw").unwrap(),
            ChannelIdentifier::ChannelId("UC_x5XG1OV2P6uZZ5FSM9Ttw".to_string())
        );
    }

    #[test]
    fn test_parse_prefers_handle() {
        assert_eq!(
            ChannelIdentifier::parse("https://youtube.com/channel/UC123/@other").unwrap(),
            ChannelIdentifier::Handle("other".to_string())
        );
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["not-a-valid-url", "", "https://www.youtube.com/watch?v=abc"] {
            assert!(matches!(
                ChannelIdentifier::parse(input),
                Err(LexiconError::InvalidIdentifier(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_invalid_identifier_makes_no_remote_calls() {
        // No expectations: any call on the mock panics
        let resolver = IdentifierResolver::new(Arc::new(MockChannelProvider::new()));

        let err = resolver.resolve("not-a-valid-url").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LexiconError>(),
            Some(LexiconError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_handle() {
        let mut provider = MockChannelProvider::new();
        provider.expect_provider_name().return_const("mock");
        provider
            .expect_channel_id_for_handle()
            .with(eq("canal"))
            .times(1)
            .returning(|_| Ok(Some("UC1".to_string())));
        provider
            .expect_channel_info()
            .with(eq("UC1"))
            .times(1)
            .returning(|id| Ok(Some(info(id))));

        let resolver = IdentifierResolver::new(Arc::new(provider));
        let resolved = resolver.resolve("https://www.youtube.com/@canal").await.unwrap();

        assert_eq!(resolved.id, "UC1");
        assert_eq!(resolved.info, Some(info("UC1")));
    }

    #[tokio::test]
    async fn test_resolve_unknown_handle() {
        let mut provider = MockChannelProvider::new();
        provider.expect_provider_name().return_const("mock");
        provider.expect_channel_id_for_handle().returning(|_| Ok(None));
        provider.expect_channel_info().never();

        let resolver = IdentifierResolver::new(Arc::new(provider));
        let err = resolver.resolve("@ghost").await.unwrap_err();

        match err.downcast_ref::<LexiconError>() {
            Some(LexiconError::EntityNotFound(handle)) => assert_eq!(handle, "@ghost"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_tolerates_metadata_failure() {
        let mut provider = MockChannelProvider::new();
        provider.expect_channel_id_for_handle().never();
        provider
            .expect_channel_info()
            .returning(|_| Err(ProviderError::new(Some(500), "backend error")));

        let resolver = IdentifierResolver::new(Arc::new(provider));
        let resolved = resolver.resolve("youtube.com/channel/UC9").await.unwrap();

        assert_eq!(resolved.id, "UC9");
        assert!(resolved.info.is_none());
    }

    #[tokio::test]
    async fn test_resolve_handle_provider_error() {
        let mut provider = MockChannelProvider::new();
        provider.expect_provider_name().return_const("mock");
        provider
            .expect_channel_id_for_handle()
            .returning(|_| Err(ProviderError::new(Some(400), "API key not valid")));

        let resolver = IdentifierResolver::new(Arc::new(provider));
        let err = resolver.resolve("@canal").await.unwrap_err();

        match err.downcast_ref::<LexiconError>() {
            Some(LexiconError::Provider(e)) => assert_eq!(e.message, "API key not valid"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "Could not resolve handle @canal");
    }

    #[tokio::test]
    async fn test_enumerate_preserves_order_and_cap() {
        let mut provider = MockChannelProvider::new();
        provider
            .expect_recent_items()
            .with(eq("UC1"), eq(2))
            .returning(|_, _| Ok(vec![item("c"), item("b"), item("a")]));

        let enumerator = ItemEnumerator::new(Arc::new(provider), 2);
        let items = enumerator.enumerate("UC1").await.unwrap();

        let ids: Vec<_> = items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_enumerate_empty_is_ok() {
        let mut provider = MockChannelProvider::new();
        provider.expect_recent_items().returning(|_, _| Ok(Vec::new()));

        let enumerator = ItemEnumerator::new(Arc::new(provider), 10);
        assert!(enumerator.enumerate("UC1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enumerate_provider_error() {
        let mut provider = MockChannelProvider::new();
        provider
            .expect_recent_items()
            .returning(|_, _| Err(ProviderError::new(Some(403), "quotaExceeded")));

        let enumerator = ItemEnumerator::new(Arc::new(provider), 10);
        let err = enumerator.enumerate("UC1").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LexiconError>(),
            Some(LexiconError::Provider(_))
        ));
        assert_eq!(err.to_string(), "Could not list videos for channel UC1");
    }

    #[test]
    fn test_max_results_clamped() {
        let provider: Arc<dyn ChannelProvider> = Arc::new(MockChannelProvider::new());
        assert_eq!(ItemEnumerator::new(provider.clone(), 50).max_results(), 20);
        assert_eq!(ItemEnumerator::new(provider, 0).max_results(), 1);
    }
}
