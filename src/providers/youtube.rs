use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ChannelProvider, EntityInfo, ItemRef, ItemStats, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Channel metadata provider backed by the YouTube Data API v3
pub struct YoutubeDataApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YoutubeDataApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Issue a GET against an API resource and decode the JSON body
    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, resource);
        tracing::debug!("YouTube Data API request: {} {:?}", resource, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::new(None, format!("Request to {} failed", resource)).with_raw_detail(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::new(Some(status.as_u16()), "Failed to read response body").with_raw_detail(e.to_string()))?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::new(Some(status.as_u16()), format!("Unexpected {} response: {}", resource, e))
                .with_raw_detail(body)
        })
    }
}

/// Build a structured error from a Google API error envelope, falling back to the raw body
pub fn parse_error_body(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => {
            let reason = envelope
                .error
                .errors
                .first()
                .and_then(|detail| detail.reason.clone());
            let message = match reason {
                Some(reason) if !envelope.error.message.contains(&reason) => {
                    format!("{} ({})", envelope.error.message, reason)
                }
                _ => envelope.error.message,
            };
            ProviderError::new(Some(envelope.error.code.unwrap_or(status)), message).with_raw_detail(body)
        }
        Err(_) => {
            let message = if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            };
            ProviderError::new(Some(status), message).with_raw_detail(body)
        }
    }
}

/// Counters arrive as decimal strings; anything unparseable stays unknown
fn parse_counter(value: Option<&String>) -> Option<u64> {
    value.and_then(|raw| raw.parse::<u64>().ok())
}

#[async_trait]
impl ChannelProvider for YoutubeDataApi {
    async fn channel_id_for_handle(&self, handle: &str) -> Result<Option<String>, ProviderError> {
        let handle = format!("@{}", handle.trim_start_matches('@'));
        let response: ListResponse<ChannelResource> = self
            .get("channels", &[("part", "id"), ("forHandle", handle.as_str())])
            .await?;

        Ok(response.items.into_iter().next().map(|channel| channel.id))
    }

    async fn channel_info(&self, channel_id: &str) -> Result<Option<EntityInfo>, ProviderError> {
        let response: ListResponse<ChannelResource> = self
            .get("channels", &[("part", "snippet,statistics"), ("id", channel_id)])
            .await?;

        Ok(response.items.into_iter().next().map(|channel| {
            let snippet = channel.snippet.unwrap_or_default();
            let statistics = channel.statistics.unwrap_or_default();
            let subscriber_count = if statistics.hidden_subscriber_count {
                None
            } else {
                parse_counter(statistics.subscriber_count.as_ref())
            };

            EntityInfo {
                id: channel.id,
                title: snippet.title,
                description: snippet.description,
                subscriber_count,
                item_count: parse_counter(statistics.video_count.as_ref()),
            }
        }))
    }

    async fn recent_items(&self, channel_id: &str, max_results: u32) -> Result<Vec<ItemRef>, ProviderError> {
        let max_results = max_results.to_string();
        let response: ListResponse<SearchResult> = self
            .get(
                "search",
                &[
                    ("part", "id,snippet"),
                    ("channelId", channel_id),
                    ("maxResults", max_results.as_str()),
                    ("order", "date"),
                    ("type", "video"),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|result| {
                let video_id = result.id.video_id?;
                let snippet = result.snippet.unwrap_or_default();
                Some(ItemRef {
                    id: video_id,
                    title: snippet.title,
                    published_at: snippet.published_at,
                })
            })
            .collect())
    }

    async fn item_stats(&self, item_id: &str) -> Result<ItemStats, ProviderError> {
        let response: ListResponse<VideoResource> = self
            .get("videos", &[("part", "statistics"), ("id", item_id)])
            .await?;

        let statistics = response
            .items
            .into_iter()
            .next()
            .and_then(|video| video.statistics)
            .unwrap_or_default();

        Ok(ItemStats {
            views: parse_counter(statistics.view_count.as_ref()),
            likes: parse_counter(statistics.like_count.as_ref()),
            dislikes: parse_counter(statistics.dislike_count.as_ref()),
        })
    }

    fn provider_name(&self) -> &'static str {
        "YouTube Data API v3"
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ChannelResource {
    id: String,
    snippet: Option<Snippet>,
    statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    published_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
    video_count: Option<String>,
    #[serde(default)]
    hidden_subscriber_count: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: SearchResultId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    dislike_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_body_structured() {
        let body = r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota.","errors":[{"reason":"quotaExceeded"}]}}"#;
        let err = parse_error_body(403, body);

        assert_eq!(err.code, Some(403));
        assert_eq!(
            err.message,
            "The request cannot be completed because you have exceeded your quota. (quotaExceeded)"
        );
        assert_eq!(err.raw_detail.as_deref(), Some(body));
    }

    #[test]
    fn test_parse_error_body_raw_text() {
        let err = parse_error_body(502, "Bad Gateway\n");
        assert_eq!(err.code, Some(502));
        assert_eq!(err.message, "Bad Gateway");

        let err = parse_error_body(500, "");
        assert_eq!(err.message, "HTTP 500");
    }

    #[test]
    fn test_parse_counter() {
        assert_eq!(parse_counter(Some(&"1234".to_string())), Some(1234));
        assert_eq!(parse_counter(Some(&"n/a".to_string())), None);
        assert_eq!(parse_counter(None), None);
    }

    #[test]
    fn test_decode_search_results_skips_non_videos() {
        let body = r#"{
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "abc123"},
                 "snippet": {"title": "Primeiro", "description": "", "publishedAt": "2024-05-01T12:00:00Z"}},
                {"id": {"kind": "youtube#playlist", "playlistId": "PL1"},
                 "snippet": {"title": "Playlist"}}
            ]
        }"#;
        let response: ListResponse<SearchResult> = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = response
            .items
            .into_iter()
            .filter_map(|result| result.id.video_id)
            .collect();

        assert_eq!(ids, vec!["abc123".to_string()]);
    }

    #[test]
    fn test_decode_video_statistics_without_dislikes() {
        let body = r#"{"items": [{"statistics": {"viewCount": "100", "likeCount": "7"}}]}"#;
        let response: ListResponse<VideoResource> = serde_json::from_str(body).unwrap();
        let statistics = response.items.into_iter().next().unwrap().statistics.unwrap();

        assert_eq!(statistics.view_count.as_deref(), Some("100"));
        assert!(statistics.dislike_count.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = YoutubeDataApi::with_base_url("key", "http://localhost:8080/v3/");
        assert_eq!(api.base_url, "http://localhost:8080/v3");
    }
}
