use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::process::Command;
use url::Url;

use super::{FetchedTranscript, TranscriptProvider, TranscriptSegment};
use crate::Result;

/// Caption transcript provider using yt-dlp for track discovery
pub struct YtDlpCaptions {
    yt_dlp_path: String,
    client: Client,
    /// Track listings per video, so a retry in another language skips yt-dlp
    tracks_by_video: Mutex<HashMap<String, Arc<Vec<CaptionTrack>>>>,
}

/// A caption track advertised by yt-dlp
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language: String,
    pub url: String,
    pub auto_generated: bool,
    /// Machine translation of another track (`tlang` in the URL)
    pub translated: bool,
}

impl CaptionTrack {
    /// Language code without yt-dlp's `-orig` marker
    pub fn base_language(&self) -> &str {
        self.language.strip_suffix("-orig").unwrap_or(&self.language)
    }

    fn matches(&self, language: &str) -> bool {
        self.base_language().eq_ignore_ascii_case(language)
    }
}

impl YtDlpCaptions {
    pub fn new() -> Self {
        Self::with_path("yt-dlp")
    }

    pub fn with_path(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            client: Client::new(),
            tracks_by_video: Mutex::new(HashMap::new()),
        }
    }

    /// Caption tracks of a video, listed once per video
    async fn tracks_for(&self, video_id: &str) -> Result<Arc<Vec<CaptionTrack>>> {
        let cached = self
            .tracks_by_video
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(video_id)
            .cloned();
        if let Some(tracks) = cached {
            return Ok(tracks);
        }

        let info = self.get_video_info(video_id).await?;
        let tracks = Arc::new(caption_tracks(&info));
        self.tracks_by_video
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(video_id.to_string(), tracks.clone());

        Ok(tracks)
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, video_id: &str) -> Result<Value> {
        let url = watch_url(video_id)?;
        tracing::debug!("Listing caption tracks for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--skip-download", "--no-playlist", url.as_str()])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        let info: Value = serde_json::from_slice(&output.stdout)?;
        Ok(info)
    }

    /// Download a json3 caption track and split it into timed entries
    async fn download_track(&self, track: &CaptionTrack) -> Result<Vec<TranscriptSegment>> {
        let response = self.client.get(&track.url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download captions: HTTP {}", response.status());
        }

        let body = response.text().await?;
        parse_json3(&body)
    }
}

#[async_trait]
impl TranscriptProvider for YtDlpCaptions {
    async fn fetch_transcript(&self, item_id: &str, languages: &[String]) -> Result<FetchedTranscript> {
        let tracks = self.tracks_for(item_id).await?;

        let track = select_track(&tracks, languages).ok_or_else(|| {
            if languages.is_empty() {
                anyhow::anyhow!("No captions available for {}", item_id)
            } else {
                anyhow::anyhow!("No captions in {} for {}", languages.join(", "), item_id)
            }
        })?;

        tracing::debug!(
            "Using {} captions ({}) for {}",
            track.language,
            if track.auto_generated { "auto-generated" } else { "manual" },
            item_id
        );

        let segments = self.download_track(track).await?;

        Ok(FetchedTranscript {
            language: track.base_language().to_string(),
            segments,
        })
    }

    fn provider_name(&self) -> &'static str {
        "yt-dlp captions"
    }
}

impl Default for YtDlpCaptions {
    fn default() -> Self {
        Self::new()
    }
}

fn watch_url(video_id: &str) -> Result<Url> {
    Url::parse_with_params("https://www.youtube.com/watch", &[("v", video_id)])
        .map_err(|e| anyhow::anyhow!("Invalid video ID {}: {}", video_id, e))
}

fn is_translation(url: &str) -> bool {
    Url::parse(url)
        .map(|url| url.query_pairs().any(|(key, _)| key == "tlang"))
        .unwrap_or(false)
}

/// Collect every json3 caption track from a yt-dlp info dump, manual tracks first
pub fn caption_tracks(info: &Value) -> Vec<CaptionTrack> {
    let mut tracks = Vec::new();

    for (field, auto_generated) in [("subtitles", false), ("automatic_captions", true)] {
        let Some(by_language) = info[field].as_object() else {
            continue;
        };

        for (language, formats) in by_language {
            let json3_url = formats
                .as_array()
                .into_iter()
                .flatten()
                .find(|format| format["ext"].as_str() == Some("json3"))
                .and_then(|format| format["url"].as_str());

            if let Some(url) = json3_url {
                tracks.push(CaptionTrack {
                    language: language.clone(),
                    url: url.to_string(),
                    auto_generated,
                    translated: is_translation(url),
                });
            }
        }
    }

    tracks
}

/// Pick a native (untranslated) track. With preferences, each language is tried in order,
/// manual before auto-generated, and `pt` also matches `pt-orig`. Without preferences, any
/// manual track wins, then the original-language auto-generated track, then any native track.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    let native = || tracks.iter().filter(|track| !track.translated);

    if !languages.is_empty() {
        return languages.iter().find_map(|language| {
            native()
                .filter(|track| track.matches(language))
                .min_by_key(|track| track.auto_generated)
        });
    }

    native()
        .find(|track| !track.auto_generated)
        .or_else(|| native().find(|track| track.language.ends_with("-orig")))
        .or_else(|| native().next())
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse YouTube's json3 caption format into timed entries
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptSegment>> {
    let captions: Json3 = serde_json::from_str(body)?;

    Ok(captions
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs?.into_iter().map(|seg| seg.utf8).collect();
            let text = text.replace('\n', " ").trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
                text,
            })
        })
        .collect())
}
