//! Score command - assess a local transcript without storing it

use super::build_assessor;
use crate::config::UserConfig;
use crate::reporters::report;
use crate::storage::{ResultStore, DEFAULT_HISTORICAL_ACCURACY};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

pub fn run(
    config: &UserConfig,
    file: &Path,
    name: Option<&str>,
    channel: Option<&str>,
    accuracy: Option<f64>,
    no_ai: bool,
    format: &str,
) -> Result<()> {
    let transcript = read_transcript(file)?;

    let historical_accuracy = match (accuracy, channel) {
        (Some(acc), _) => acc,
        (None, Some(channel_id)) => ResultStore::from_config(config)
            .historical_accuracy(channel_id)
            .context("Failed to read stored accuracy")?,
        (None, None) => DEFAULT_HISTORICAL_ACCURACY,
    };

    let assessor = build_assessor(config, no_ai)?;
    let result = assessor.assess(
        name,
        channel.unwrap_or(""),
        &transcript,
        historical_accuracy,
    );

    println!("{}", report(&result, format)?);
    Ok(())
}

fn read_transcript(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read transcript from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read transcript: {}", file.display()))
}
