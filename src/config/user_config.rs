//! User-level configuration for credence
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/credence/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default number of videos analyzed per channel
pub const DEFAULT_MAX_VIDEOS: usize = 3;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub youtube: YoutubeSettings,
    #[serde(default)]
    pub transcription: TranscriptionSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub baseline: BaselineSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AiSettings {
    /// Set to false to always use the template narrative
    pub enabled: Option<bool>,

    /// LLM backend: "anthropic" (default), "openai", "ollama"
    pub backend: Option<String>,

    /// Model override (defaults per backend)
    pub model: Option<String>,

    pub anthropic_api_key: Option<String>,

    pub openai_api_key: Option<String>,

    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct YoutubeSettings {
    /// YouTube Data API v3 key, used to list a channel's recent videos
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TranscriptionSettings {
    /// "speech" (yt-dlp + Whisper, default) or "captions" (published YouTube captions)
    pub source: Option<String>,

    /// Caption language code (default: en)
    pub caption_language: Option<String>,

    /// yt-dlp executable (default: yt-dlp)
    pub yt_dlp: Option<String>,

    /// Whisper-compatible CLI (default: whisper)
    pub whisper_command: Option<String>,

    /// Whisper model name (default: base)
    pub whisper_model: Option<String>,

    /// Read `<video_id>.txt` transcripts from here instead of transcribing
    pub transcripts_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageSettings {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisSettings {
    pub max_videos: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BaselineSettings {
    /// TOML file replacing the built-in reference cohort
    pub cohort_path: Option<PathBuf>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/credence/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            match Self::load_file(&path) {
                Ok(file_config) => {
                    debug!("Loaded user config from {}", path.display());
                    config.merge(file_config);
                }
                Err(e) => warn!("Ignoring {}: {:#}", path.display(), e),
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a single config file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("credence").join("config.toml"))
    }

    /// Environment variables override file settings
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("ANTHROPIC_API_KEY") {
            self.ai.anthropic_api_key = Some(key);
        }
        if let Some(key) = var("OPENAI_API_KEY") {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(key) = var("YOUTUBE_API_KEY") {
            self.youtube.api_key = Some(key);
        }
        if let Some(dir) = var("CREDENCE_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        fn take<T>(base: &mut Option<T>, other: Option<T>) {
            if other.is_some() {
                *base = other;
            }
        }

        take(&mut self.ai.enabled, other.ai.enabled);
        take(&mut self.ai.backend, other.ai.backend);
        take(&mut self.ai.model, other.ai.model);
        take(&mut self.ai.anthropic_api_key, other.ai.anthropic_api_key);
        take(&mut self.ai.openai_api_key, other.ai.openai_api_key);
        take(&mut self.ai.max_tokens, other.ai.max_tokens);
        take(&mut self.youtube.api_key, other.youtube.api_key);
        take(&mut self.transcription.source, other.transcription.source);
        take(&mut self.transcription.caption_language, other.transcription.caption_language);
        take(&mut self.transcription.yt_dlp, other.transcription.yt_dlp);
        take(&mut self.transcription.whisper_command, other.transcription.whisper_command);
        take(&mut self.transcription.whisper_model, other.transcription.whisper_model);
        take(&mut self.transcription.transcripts_dir, other.transcription.transcripts_dir);
        take(&mut self.storage.data_dir, other.storage.data_dir);
        take(&mut self.analysis.max_videos, other.analysis.max_videos);
        take(&mut self.baseline.cohort_path, other.baseline.cohort_path);
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai.enabled.unwrap_or(true)
    }

    pub fn ai_backend(&self) -> &str {
        self.ai.backend.as_deref().unwrap_or("anthropic")
    }

    pub fn youtube_api_key(&self) -> Option<&str> {
        self.youtube.api_key.as_deref()
    }

    pub fn transcript_source(&self) -> &str {
        self.transcription.source.as_deref().unwrap_or("speech")
    }

    pub fn caption_language(&self) -> &str {
        self.transcription.caption_language.as_deref().unwrap_or("en")
    }

    pub fn yt_dlp(&self) -> &str {
        self.transcription.yt_dlp.as_deref().unwrap_or("yt-dlp")
    }

    pub fn whisper_command(&self) -> &str {
        self.transcription
            .whisper_command
            .as_deref()
            .unwrap_or("whisper")
    }

    pub fn whisper_model(&self) -> &str {
        self.transcription.whisper_model.as_deref().unwrap_or("base")
    }

    /// Videos per channel; 0 in the file means "use the default".
    pub fn max_videos(&self) -> usize {
        self.analysis
            .max_videos
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_VIDEOS)
    }

    /// Directory holding results and accuracy records.
    /// Uses ~/.local/share/credence on Linux (platform data dir elsewhere).
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("credence")
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, EXAMPLE_CONFIG)?;
        }

        Ok(config_path)
    }
}

const EXAMPLE_CONFIG: &str = r#"# Credence User Configuration

[ai]
# Backend: "anthropic" (needs API key), "openai", or "ollama" (free, local)
# backend = "anthropic"
# enabled = true
# model = "claude-sonnet-4-20250514"
# anthropic_api_key = "sk-ant-..."
# openai_api_key = "sk-..."

[youtube]
# Needed to list a channel's recent videos
# api_key = "AIza..."

[transcription]
# "speech" downloads audio and runs Whisper; "captions" fetches published captions
# source = "speech"
# caption_language = "en"
# yt_dlp = "yt-dlp"
# whisper_command = "whisper"
# whisper_model = "base"
# Use pre-made transcripts (<video_id>.txt) instead of downloading audio
# transcripts_dir = "/path/to/transcripts"

[storage]
# data_dir = "/path/to/credence-data"

[analysis]
# max_videos = 3

[baseline]
# Replace the built-in reference cohort
# cohort_path = "/path/to/cohort.toml"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(config.ai_enabled());
        assert_eq!(config.ai_backend(), "anthropic");
        assert_eq!(config.max_videos(), DEFAULT_MAX_VIDEOS);
        assert_eq!(config.yt_dlp(), "yt-dlp");
        assert_eq!(config.whisper_command(), "whisper");
        assert_eq!(config.whisper_model(), "base");
        assert_eq!(config.transcript_source(), "speech");
        assert_eq!(config.caption_language(), "en");
        assert!(config.youtube_api_key().is_none());
        assert!(config.data_dir().ends_with("credence"));
    }

    #[test]
    fn test_example_config_parses() {
        let config: UserConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.ai.backend.is_none());
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
[ai]
backend = "ollama"
enabled = false

[analysis]
max_videos = 7

[storage]
data_dir = "/tmp/credence-test"

[transcription]
transcripts_dir = "/srv/transcripts"
source = "captions"
caption_language = "de"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ai_backend(), "ollama");
        assert!(!config.ai_enabled());
        assert_eq!(config.max_videos(), 7);
        assert_eq!(config.transcript_source(), "captions");
        assert_eq!(config.caption_language(), "de");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/credence-test"));
        assert_eq!(
            config.transcription.transcripts_dir.as_deref(),
            Some(Path::new("/srv/transcripts"))
        );
    }

    #[test]
    fn test_zero_max_videos_uses_default() {
        let config: UserConfig = toml::from_str("[analysis]\nmax_videos = 0\n").unwrap();
        assert_eq!(config.max_videos(), DEFAULT_MAX_VIDEOS);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(toml::from_str::<UserConfig>("this is [[ not valid toml {{{}}}").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ANTHROPIC_API_KEY", "sk-ant-env"),
            ("YOUTUBE_API_KEY", "yt-env"),
            ("CREDENCE_DATA_DIR", "/data/env"),
        ]
        .into_iter()
        .collect();

        let mut config = UserConfig::default();
        config.ai.anthropic_api_key = Some("sk-ant-file".into());
        config.apply_env(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.ai.anthropic_api_key.as_deref(), Some("sk-ant-env"));
        assert_eq!(config.youtube_api_key(), Some("yt-env"));
        assert_eq!(config.data_dir(), PathBuf::from("/data/env"));
        assert!(config.ai.openai_api_key.is_none());
    }

    #[test]
    fn test_merge_overrides_set_fields_only() {
        let mut base = UserConfig::default();
        base.ai.backend = Some("openai".into());
        base.analysis.max_videos = Some(2);

        let mut other = UserConfig::default();
        other.analysis.max_videos = Some(5);
        other.youtube.api_key = Some("key".into());

        base.merge(other);
        assert_eq!(base.ai_backend(), "openai");
        assert_eq!(base.max_videos(), 5);
        assert_eq!(base.youtube_api_key(), Some("key"));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ai]\nmodel = \"gpt-4o\"\n").unwrap();
        let config = UserConfig::load_file(&path).unwrap();
        assert_eq!(config.ai.model.as_deref(), Some("gpt-4o"));

        assert!(UserConfig::load_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_user_config_path() {
        if let Some(p) = UserConfig::user_config_path() {
            assert!(p.ends_with("credence/config.toml"));
        }
    }
}
