//! Analyze command - acquire transcripts for a channel and score them

use super::{build_analyzer, build_assessor, build_catalog};
use crate::config::UserConfig;
use crate::pipeline::AnalysisRequest;
use crate::reporters::{report_with_format, OutputFormat};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub struct AnalyzeArgs {
    pub channel_id: String,
    pub name: Option<String>,
    pub max_videos: Option<usize>,
    pub videos: Vec<String>,
    pub transcripts: Option<PathBuf>,
    pub captions: bool,
    pub no_ai: bool,
    pub no_save: bool,
    pub format: String,
    pub output: Option<PathBuf>,
}

pub fn run(config: &UserConfig, args: AnalyzeArgs) -> Result<()> {
    let format = OutputFormat::from_str(&args.format)?;
    let assessor = build_assessor(config, args.no_ai)?;
    let catalog = build_catalog(config, &args.videos)?;
    let analyzer = build_analyzer(config, assessor, catalog, args.transcripts, args.captions)?
        .persist(!args.no_save);

    let request = AnalysisRequest {
        channel_id: args.channel_id,
        display_name: args.name,
        max_videos: args.max_videos,
    };

    // Keep stdout clean for JSON consumers
    let spinner = (format == OutputFormat::Text).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(create_spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Analyzing {}...", request.channel_id));
        spinner
    });

    let outcome = analyzer.analyze(&request);
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let result = outcome.with_context(|| format!("Analysis of {} failed", request.channel_id))?;

    let rendered = report_with_format(&result, format)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => println!("{}", rendered),
    }

    if format == OutputFormat::Text && !args.no_save {
        eprintln!(
            "{} Saved under {}",
            style("✓").green(),
            style(analyzer.store().dir().display()).dim()
        );
    }
    Ok(())
}

fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .expect("valid spinner template")
}
