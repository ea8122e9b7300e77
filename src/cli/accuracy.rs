//! Accuracy command - read or record verified prediction accuracy

use crate::storage::ResultStore;
use anyhow::{Context, Result};
use console::style;

pub fn run(store: &ResultStore, channel_id: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(accuracy) => {
            store
                .save_historical_accuracy(channel_id, accuracy)
                .with_context(|| format!("Failed to record accuracy for {}", channel_id))?;
            println!(
                "{} Historical accuracy for {} set to {}",
                style("✓").green(),
                style(channel_id).cyan(),
                style(format!("{accuracy:.1}")).bold()
            );
        }
        None => {
            let records = store.list_accuracy().context("Failed to read accuracy records")?;
            match records.get(channel_id) {
                Some(record) => println!(
                    "{}: {:.1} {}",
                    channel_id,
                    record.accuracy,
                    style(format!("(updated {})", record.updated_at.format("%Y-%m-%d"))).dim()
                ),
                None => println!(
                    "{}: {:.1} {}",
                    channel_id,
                    store.historical_accuracy(channel_id)?,
                    style("(default, no record)").dim()
                ),
            }
        }
    }
    Ok(())
}
