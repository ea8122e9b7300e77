//! Baseline command - print the reference cohort

use crate::baseline::BaselineCohort;
use crate::reporters::{render_json, OutputFormat};
use anyhow::Result;
use console::style;
use serde_json::json;
use std::str::FromStr;

pub fn run(cohort: &BaselineCohort, format: &str) -> Result<()> {
    let stats = cohort.stats();

    if OutputFormat::from_str(format)? == OutputFormat::Json {
        let value = json!({"entries": cohort.entries, "stats": stats});
        println!("{}", render_json(&value)?);
        return Ok(());
    }

    println!("\n{} ({} members)\n", style("Baseline cohort").bold(), cohort.len());
    println!(
        "  {:<20} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "NAME", "INTENSITY", "CERTAINTY", "TECHNICAL", "PREDICT", "ACCURACY"
    );
    for entry in &cohort.entries {
        let m = &entry.metrics;
        println!(
            "  {:<20} {:>9.1} {:>9.1} {:>9.1} {:>9.1} {:>9.1}",
            entry.name,
            m.emotional_intensity,
            m.certainty_index,
            m.technical_depth,
            m.prediction_density,
            entry.historical_accuracy
        );
    }
    println!(
        "  {:<20} {:>9.1} {:>9.1} {:>9.1} {:>9} {:>9.1}\n",
        style("median").dim(),
        stats.median_emotional_intensity,
        stats.median_certainty_index,
        stats.median_technical_depth,
        "",
        stats.median_historical_accuracy
    );
    Ok(())
}
