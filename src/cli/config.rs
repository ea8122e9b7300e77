//! Config command - initialize or display user configuration

use super::{load_config, ConfigAction};
use crate::config::UserConfig;
use anyhow::Result;
use console::style;
use std::path::PathBuf;

pub fn run(action: ConfigAction, data_dir: Option<PathBuf>) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = UserConfig::init_user_config()?;
            println!(
                "{} Config initialized at: {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
            println!("\nOr set via environment:");
            println!("  export ANTHROPIC_API_KEY=\"sk-ant-...\"");
            println!("  export YOUTUBE_API_KEY=\"AIza...\"");
            Ok(())
        }
        ConfigAction::Show => show(&load_config(data_dir)?),
    }
}

/// Keep only enough of a secret to recognize it
fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        None | Some("") => style("✗ not set").red().to_string(),
        Some(s) if s.chars().count() <= 8 => "********".to_string(),
        Some(s) => {
            let head: String = s.chars().take(4).collect();
            let tail: String = s.chars().skip(s.chars().count() - 4).collect();
            format!("{head}...{tail}")
        }
    }
}

fn show(config: &UserConfig) -> Result<()> {
    println!("{}", style("Config file").bold());
    if let Some(path) = UserConfig::user_config_path() {
        let status = if path.exists() { "✓" } else { "(not found)" };
        println!("  {} {}", path.display(), status);
    }
    println!("  Data dir: {}", config.data_dir().display());

    println!("\n{}", style("AI").bold());
    println!("  Enabled:  {}", config.ai_enabled());
    println!("  Backend:  {}", config.ai_backend());
    if let Some(model) = &config.ai.model {
        println!("  Model:    {}", model);
    }
    println!(
        "  ANTHROPIC_API_KEY: {}",
        mask_secret(config.ai.anthropic_api_key.as_deref())
    );
    println!(
        "  OPENAI_API_KEY:    {}",
        mask_secret(config.ai.openai_api_key.as_deref())
    );

    println!("\n{}", style("Sources").bold());
    println!("  YOUTUBE_API_KEY: {}", mask_secret(config.youtube_api_key()));
    println!(
        "  Transcripts:     {} (captions: {})",
        config.transcript_source(),
        config.caption_language()
    );
    println!("  yt-dlp:          {}", config.yt_dlp());
    println!(
        "  whisper:         {} (model {})",
        config.whisper_command(),
        config.whisper_model()
    );
    if let Some(dir) = &config.transcription.transcripts_dir {
        println!("  Transcripts dir: {}", dir.display());
    }
    println!("  Max videos:      {}", config.max_videos());

    if let Some(path) = &config.baseline.cohort_path {
        println!("\n{}", style("Baseline").bold());
        println!("  Cohort file: {}", path.display());
    }
    Ok(())
}
