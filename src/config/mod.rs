//! Configuration module for Credence
//!
//! This module handles:
//! - User-level configuration (~/.config/credence/config.toml)
//! - Environment variable overrides (API keys, data directory)

mod user_config;

pub use user_config::{
    AiSettings, AnalysisSettings, BaselineSettings, StorageSettings, TranscriptionSettings,
    UserConfig, YoutubeSettings, DEFAULT_MAX_VIDEOS,
};
