use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::analysis::{StopwordLanguage, MAX_TOP_N};
use crate::channel::MAX_RESULTS_LIMIT;
use crate::providers::youtube::DEFAULT_BASE_URL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// YouTube Data API settings
    pub youtube: YoutubeConfig,

    /// Caption retrieval settings
    pub captions: CaptionsConfig,

    /// Word-frequency settings
    pub analysis: AnalysisConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoutubeConfig {
    /// API key; `YOUTUBE_API_KEY` or `--api-key` take precedence
    pub api_key: Option<String>,

    /// API root, overridable for testing against a local mock
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionsConfig {
    /// Caption languages to try first, in order
    pub preferred_languages: Vec<String>,

    /// Path to the yt-dlp executable
    pub yt_dlp_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Stopword language
    pub language: StopwordLanguage,

    /// Rows per frequency table
    pub top_n: usize,

    /// Videos analyzed per run
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Videos fetched concurrently; 1 processes them strictly one after another
    pub max_concurrent_fetches: usize,

    /// Default output format
    pub default_output_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            youtube: YoutubeConfig {
                api_key: None,
                base_url: DEFAULT_BASE_URL.to_string(),
            },
            captions: CaptionsConfig {
                preferred_languages: vec!["pt".to_string(), "en".to_string()],
                yt_dlp_path: "yt-dlp".to_string(),
            },
            analysis: AnalysisConfig {
                language: StopwordLanguage::Portuguese,
                top_n: 10,
                max_results: 10,
            },
            app: AppConfig {
                max_concurrent_fetches: 1,
                default_output_format: "text".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("channel-lexicon").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TOP_N).contains(&self.analysis.top_n) {
            anyhow::bail!("analysis.top_n must be between 1 and {}", MAX_TOP_N);
        }

        if !(1..=MAX_RESULTS_LIMIT).contains(&self.analysis.max_results) {
            anyhow::bail!("analysis.max_results must be between 1 and {}", MAX_RESULTS_LIMIT);
        }

        if self.app.max_concurrent_fetches == 0 {
            anyhow::bail!("app.max_concurrent_fetches must be at least 1");
        }

        if self.captions.preferred_languages.iter().any(|lang| lang.trim().is_empty()) {
            anyhow::bail!("captions.preferred_languages must not contain empty entries");
        }

        Url::parse(&self.youtube.base_url)
            .with_context(|| format!("Invalid youtube.base_url: {}", self.youtube.base_url))?;

        Ok(())
    }

    /// Resolve the API key, preferring an explicit override
    pub fn api_key(&self, override_key: Option<&str>) -> Result<String> {
        override_key
            .or(self.youtube.api_key.as_deref())
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .context("YouTube Data API key must be configured (set YOUTUBE_API_KEY, pass --api-key, or edit the config file)")
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!(
            "  API Key: {}",
            if self.youtube.api_key.is_some() { "configured" } else { "not set" }
        );
        println!("  API Base URL: {}", self.youtube.base_url);
        println!("  Caption Languages: {}", self.captions.preferred_languages.join(", "));
        println!("  yt-dlp: {}", self.captions.yt_dlp_path);
        println!("  Stopwords: {}", self.analysis.language);
        println!("  Top Words: {}", self.analysis.top_n);
        println!("  Max Videos: {}", self.analysis.max_results);
        println!("  Concurrent Fetches: {}", self.app.max_concurrent_fetches);
        println!("  Default Format: {}", self.app.default_output_format);
    }
}
