//! CLI command definitions and handlers

mod accuracy;
mod analyze;
mod baseline;
mod config;
mod results;
mod score;
mod serve;

use crate::ai::{AiClient, LlmNarrator};
use crate::baseline::BaselineCohort;
use crate::config::UserConfig;
use crate::pipeline::{Analyzer, Assessor};
use crate::sources::{
    CaptionTranscripts, DirectoryTranscripts, SpeechToText, StaticCatalog, TranscriptSource,
    VideoCatalog, YoutubeCatalog,
};
use crate::storage::ResultStore;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Parse and validate a historical accuracy (0-100)
fn parse_accuracy(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        Err("accuracy must be between 0 and 100".to_string())
    } else {
        Ok(value)
    }
}

/// Parse and validate a video cap (at least 1)
fn parse_max_videos(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("max-videos must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

/// Credence - transcript credibility analysis
#[derive(Parser, Debug)]
#[command(name = "credence")]
#[command(
    version,
    about = "Score the credibility of market commentators from their video transcripts",
    long_about = "Credence measures hype, certainty, technical depth and prediction density in \
spoken-word transcripts, folds them with verified historical accuracy into a 0-100 \
credibility score, and ranks the result against a reference cohort.",
    after_help = "\
Examples:
  credence analyze UCxxxx --name \"Some Trader\"      Analyze a channel's latest videos
  credence analyze UCxxxx --video https://www.youtube.com/watch?v=abc123
  credence score transcript.txt --accuracy 62       Score a local transcript
  credence accuracy UCxxxx 58                       Record verified accuracy
  credence show UCxxxx --format json                Print the stored result
  credence serve                                    JSON server on stdin/stdout"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Directory for stored results and accuracy records
    #[arg(long, global = true, env = "CREDENCE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a channel's recent videos and store the result
    #[command(after_help = "\
Examples:
  credence analyze UCxxxx                                  Latest 3 uploads (needs YOUTUBE_API_KEY)
  credence analyze UCxxxx --max-videos 5 --format json
  credence analyze UCxxxx --video URL1 --video URL2        Explicit videos, no API key needed
  credence analyze UCxxxx --video URL --transcripts ./txt  Use <video_id>.txt files
  credence analyze UCxxxx --captions                       Published captions instead of Whisper")]
    Analyze {
        /// Channel id the result is stored under
        channel_id: String,

        /// Display name of the influencer
        #[arg(long)]
        name: Option<String>,

        /// Maximum videos to analyze (default: from config, 3)
        #[arg(long, value_parser = parse_max_videos)]
        max_videos: Option<usize>,

        /// Analyze these watch URLs instead of listing the channel
        #[arg(long = "video")]
        videos: Vec<String>,

        /// Read transcripts from <DIR>/<video_id>.txt instead of transcribing
        #[arg(long)]
        transcripts: Option<PathBuf>,

        /// Use published YouTube captions instead of transcribing audio
        #[arg(long, conflicts_with = "transcripts")]
        captions: bool,

        /// Use the template explanation (no LLM call)
        #[arg(long)]
        no_ai: bool,

        /// Do not store the result
        #[arg(long)]
        no_save: bool,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Score a transcript file ("-" for stdin) without storing anything
    Score {
        /// Transcript file
        file: PathBuf,

        /// Display name of the speaker
        #[arg(long)]
        name: Option<String>,

        /// Look up stored accuracy for this channel
        #[arg(long)]
        channel: Option<String>,

        /// Historical accuracy to score against (overrides --channel lookup)
        #[arg(long, value_parser = parse_accuracy)]
        accuracy: Option<f64>,

        /// Use the template explanation (no LLM call)
        #[arg(long)]
        no_ai: bool,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Show the stored result for a channel
    Show {
        channel_id: String,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// List all stored results
    List {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Show or record a channel's verified prediction accuracy
    Accuracy {
        channel_id: String,

        /// New accuracy (0-100); omit to print the current value
        #[arg(value_parser = parse_accuracy)]
        value: Option<f64>,
    },

    /// Show the reference cohort and its medians
    Baseline {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Serve analysis requests as line-delimited JSON on stdin/stdout
    Serve {
        /// Read transcripts from <DIR>/<video_id>.txt instead of transcribing
        #[arg(long)]
        transcripts: Option<PathBuf>,

        /// Use published YouTube captions instead of transcribing audio
        #[arg(long, conflicts_with = "transcripts")]
        captions: bool,

        /// Use the template explanation (no LLM call)
        #[arg(long)]
        no_ai: bool,
    },

    /// Manage configuration (init or show)
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize config file with example settings
    Init,
    /// Show effective configuration (secrets masked)
    Show,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            channel_id,
            name,
            max_videos,
            videos,
            transcripts,
            captions,
            no_ai,
            no_save,
            format,
            output,
        } => {
            let config = load_config(cli.data_dir)?;
            analyze::run(
                &config,
                analyze::AnalyzeArgs {
                    channel_id,
                    name,
                    max_videos,
                    videos,
                    transcripts,
                    captions,
                    no_ai,
                    no_save,
                    format,
                    output,
                },
            )
        }

        Commands::Score {
            file,
            name,
            channel,
            accuracy,
            no_ai,
            format,
        } => {
            let config = load_config(cli.data_dir)?;
            score::run(
                &config,
                &file,
                name.as_deref(),
                channel.as_deref(),
                accuracy,
                no_ai,
                &format,
            )
        }

        Commands::Show { channel_id, format } => {
            let config = load_config(cli.data_dir)?;
            results::show(&ResultStore::from_config(&config), &channel_id, &format)
        }

        Commands::List { format } => {
            let config = load_config(cli.data_dir)?;
            results::list(&ResultStore::from_config(&config), &format)
        }

        Commands::Accuracy { channel_id, value } => {
            let config = load_config(cli.data_dir)?;
            accuracy::run(&ResultStore::from_config(&config), &channel_id, value)
        }

        Commands::Baseline { format } => {
            let config = load_config(cli.data_dir)?;
            baseline::run(&load_cohort(&config)?, &format)
        }

        Commands::Serve {
            transcripts,
            captions,
            no_ai,
        } => {
            let config = load_config(cli.data_dir)?;
            serve::run(&config, transcripts, captions, no_ai)
        }

        Commands::Config { action } => config::run(action, cli.data_dir),
    }
}

/// User config with the `--data-dir` override applied
fn load_config(data_dir: Option<PathBuf>) -> Result<UserConfig> {
    let mut config = UserConfig::load()?;
    if let Some(dir) = data_dir {
        config.storage.data_dir = Some(dir);
    }
    debug!("Data directory: {}", config.data_dir().display());
    Ok(config)
}

fn load_cohort(config: &UserConfig) -> Result<BaselineCohort> {
    match &config.baseline.cohort_path {
        Some(path) => BaselineCohort::load(path),
        None => Ok(BaselineCohort::reference().clone()),
    }
}

/// Assessor with the configured cohort and, unless disabled, a live narrator
fn build_assessor(config: &UserConfig, no_ai: bool) -> Result<Assessor> {
    let assessor = Assessor::new(load_cohort(config)?);
    if no_ai || !config.ai_enabled() {
        return Ok(assessor);
    }

    match AiClient::from_user_config(config) {
        Ok(client) => Ok(assessor.with_narrator(Box::new(LlmNarrator::new(client)))),
        Err(e) => {
            warn!("AI explanations unavailable, using template: {}", e);
            Ok(assessor)
        }
    }
}

/// Explicit video URLs win over the YouTube API
fn build_catalog(config: &UserConfig, videos: &[String]) -> Result<Box<dyn VideoCatalog>> {
    if !videos.is_empty() {
        return Ok(Box::new(StaticCatalog::from_urls(videos)));
    }
    let catalog = YoutubeCatalog::from_key(config.youtube_api_key())
        .context("Cannot list channel videos; pass --video URLs or set YOUTUBE_API_KEY")?;
    Ok(Box::new(catalog))
}

/// Pick the transcript source. Precedence: `--transcripts`, `--captions`,
/// `transcription.transcripts_dir`, then `transcription.source`.
fn build_transcripts(
    config: &UserConfig,
    transcripts: Option<PathBuf>,
    captions: bool,
) -> Result<Box<dyn TranscriptSource>> {
    if let Some(dir) = transcripts {
        return Ok(Box::new(DirectoryTranscripts::new(dir)));
    }
    if captions {
        return Ok(Box::new(CaptionTranscripts::new(config.caption_language())));
    }
    if let Some(dir) = &config.transcription.transcripts_dir {
        return Ok(Box::new(DirectoryTranscripts::new(dir.clone())));
    }

    match config.transcript_source() {
        "speech" => Ok(Box::new(SpeechToText::new(
            config.yt_dlp(),
            config.whisper_command(),
            config.whisper_model(),
        ))),
        "captions" => Ok(Box::new(CaptionTranscripts::new(config.caption_language()))),
        other => bail!(
            "Unknown transcription.source '{}'. Valid sources: speech, captions",
            other
        ),
    }
}

fn build_analyzer(
    config: &UserConfig,
    assessor: Assessor,
    catalog: Box<dyn VideoCatalog>,
    transcripts: Option<PathBuf>,
    captions: bool,
) -> Result<Analyzer> {
    Ok(Analyzer::new(
        assessor,
        catalog,
        build_transcripts(config, transcripts, captions)?,
        ResultStore::from_config(config),
    )
    .default_max_videos(config.max_videos()))
}
