//! Show and list commands - print stored analyses

use crate::reporters::{render_json, report_with_format, OutputFormat};
use crate::storage::ResultStore;
use anyhow::{Context, Result};
use console::style;
use std::str::FromStr;

pub fn show(store: &ResultStore, channel_id: &str, format: &str) -> Result<()> {
    let stored = store
        .get_result(channel_id)
        .context("Failed to read stored results")?
        .with_context(|| {
            format!(
                "No stored analysis for '{}'. Run `credence analyze {}` first.",
                channel_id, channel_id
            )
        })?;

    match OutputFormat::from_str(format)? {
        OutputFormat::Json => println!("{}", render_json(&stored)?),
        OutputFormat::Text => {
            print!("{}", report_with_format(&stored.result, OutputFormat::Text)?);
            println!(
                "\n{}",
                style(format!(
                    "Analyzed at {}",
                    stored.analyzed_at.format("%Y-%m-%d %H:%M UTC")
                ))
                .dim()
            );
        }
    }
    Ok(())
}

pub fn list(store: &ResultStore, format: &str) -> Result<()> {
    let results = store.list_results().context("Failed to read stored results")?;

    match OutputFormat::from_str(format)? {
        OutputFormat::Json => println!("{}", render_json(&results)?),
        OutputFormat::Text => {
            if results.is_empty() {
                println!("No stored analyses in {}", store.dir().display());
                return Ok(());
            }
            println!(
                "\n  {:<28} {:<24} {:>6} {:>7}  {}",
                style("CHANNEL").bold(),
                style("NAME").bold(),
                style("SCORE").bold(),
                style("VIDEOS").bold(),
                style("ANALYZED").bold()
            );
            for (channel_id, stored) in &results {
                let r = &stored.result;
                println!(
                    "  {:<28} {:<24} {:>6.1} {:>7}  {}",
                    channel_id,
                    r.influencer_name,
                    r.credibility.credibility_score,
                    r.analysis_summary.videos_analyzed,
                    style(stored.analyzed_at.format("%Y-%m-%d %H:%M")).dim()
                );
            }
            println!();
        }
    }
    Ok(())
}
