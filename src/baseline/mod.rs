//! Baseline cohort comparison
//!
//! Ranks a subject against a small, fixed reference cohort.
//!
//! Medians use the lower-middle element of the sorted values (index
//! `len / 2`) rather than averaging the two middle elements. Percentile ranks
//! insert the subject value into the cohort list, sort, and take the first
//! index equal to the subject value, so ties with cohort members resolve to
//! the lowest rank among equal values. Both rules are kept for
//! reproducibility; expect surprising ties if the cohort grows.

use crate::models::{clamp_pct, round_to, BaselineComparison, BaselineStats, MetricSet};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Reference metrics for one cohort member
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortMetrics {
    pub emotional_intensity: f64,
    pub certainty_index: f64,
    pub technical_depth: f64,
    pub prediction_density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub key: String,
    pub name: String,
    pub metrics: CohortMetrics,
    pub historical_accuracy: f64,
}

impl BaselineEntry {
    fn calibration_gap(&self) -> f64 {
        self.metrics.certainty_index - self.historical_accuracy
    }
}

/// Read-only reference cohort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BaselineCohort {
    #[serde(default)]
    pub entries: Vec<BaselineEntry>,
}

static REFERENCE: OnceLock<BaselineCohort> = OnceLock::new();

fn entry(key: &str, name: &str, metrics: [f64; 4], historical_accuracy: f64) -> BaselineEntry {
    let [emotional_intensity, certainty_index, technical_depth, prediction_density] = metrics;
    BaselineEntry {
        key: key.to_string(),
        name: name.to_string(),
        metrics: CohortMetrics {
            emotional_intensity,
            certainty_index,
            technical_depth,
            prediction_density,
        },
        historical_accuracy,
    }
}

impl BaselineCohort {
    /// Built-in three-member reference cohort.
    pub fn reference() -> &'static BaselineCohort {
        REFERENCE.get_or_init(|| BaselineCohort {
            entries: vec![
                entry("benjamin_cowen", "Benjamin Cowen", [25.0, 35.0, 72.0, 42.0], 65.0),
                entry("willy_woo", "Willy Woo", [45.0, 58.0, 85.0, 55.0], 58.0),
                entry("raoul_pal", "Raoul Pal", [68.0, 72.0, 65.0, 70.0], 52.0),
            ],
        })
    }

    /// Parse a cohort from TOML (`[[entries]]` tables).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cohort: BaselineCohort =
            toml::from_str(content).context("Invalid baseline cohort TOML")?;
        Ok(cohort)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cohort file: {}", path.display()))?;
        let cohort = Self::from_toml_str(&content)?;
        debug!(
            "Loaded baseline cohort of {} from {}",
            cohort.len(),
            path.display()
        );
        Ok(cohort)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lower-middle medians of each cohort metric.
    pub fn stats(&self) -> BaselineStats {
        let column =
            |f: fn(&BaselineEntry) -> f64| -> Vec<f64> { self.entries.iter().map(f).collect() };
        BaselineStats {
            median_emotional_intensity: lower_median(column(|e| e.metrics.emotional_intensity)),
            median_certainty_index: lower_median(column(|e| e.metrics.certainty_index)),
            median_technical_depth: lower_median(column(|e| e.metrics.technical_depth)),
            median_historical_accuracy: lower_median(column(|e| e.historical_accuracy)),
            cohort_size: self.entries.len(),
        }
    }
}

/// Element at index `len / 2` of the ascending values; 0.0 when empty.
pub fn lower_median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values[values.len() / 2]
}

/// Rank of `subject` among `cohort` plus itself, as a percentage, using the
/// first index equal to `subject` after sorting.
pub fn first_match_percentile(mut cohort: Vec<f64>, subject: f64) -> f64 {
    cohort.push(subject);
    cohort.sort_by(f64::total_cmp);
    let index = cohort.iter().position(|v| *v == subject).unwrap_or(0);
    index as f64 / cohort.len() as f64 * 100.0
}

/// Compare a subject's metrics and accuracy against `cohort`.
pub fn compare(
    metrics: &MetricSet,
    historical_accuracy: f64,
    cohort: &BaselineCohort,
) -> BaselineComparison {
    let stats = cohort.stats();

    let hype_multiplier = metrics.emotional_intensity / stats.median_emotional_intensity.max(1.0);
    let certainty_deviation = metrics.certainty_index - stats.median_certainty_index;
    let technical_deviation = metrics.technical_depth - stats.median_technical_depth;

    let accuracies = cohort.entries.iter().map(|e| e.historical_accuracy).collect();
    let accuracy_percentile = first_match_percentile(accuracies, historical_accuracy);

    let gaps = cohort.entries.iter().map(BaselineEntry::calibration_gap).collect();
    let subject_gap = metrics.certainty_index - historical_accuracy;
    let calibration_percentile = first_match_percentile(gaps, subject_gap);

    BaselineComparison {
        hype_multiplier: round_to(hype_multiplier.max(0.0), 2),
        certainty_deviation: round_to(certainty_deviation, 1),
        technical_deviation: round_to(technical_deviation, 1),
        accuracy_percentile: round_to(clamp_pct(accuracy_percentile), 0),
        calibration_percentile: round_to(clamp_pct(calibration_percentile), 0),
        baseline_stats: stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(ei: f64, ci: f64, td: f64) -> MetricSet {
        MetricSet {
            emotional_intensity: ei,
            certainty_index: ci,
            technical_depth: td,
            prediction_density: 50.0,
            word_count: 500,
        }
    }

    #[test]
    fn test_reference_medians() {
        let stats = BaselineCohort::reference().stats();
        assert_eq!(stats.median_emotional_intensity, 45.0);
        assert_eq!(stats.median_certainty_index, 58.0);
        assert_eq!(stats.median_technical_depth, 72.0);
        assert_eq!(stats.median_historical_accuracy, 58.0);
        assert_eq!(stats.cohort_size, 3);
    }

    #[test]
    fn test_lower_median_even_length() {
        assert_eq!(lower_median(vec![4.0, 1.0, 3.0, 2.0]), 3.0);
        assert_eq!(lower_median(vec![]), 0.0);
    }

    #[test]
    fn test_first_match_percentile_ties() {
        // sorted: [52, 58, 58, 65] -> first 58 at index 1
        assert_eq!(first_match_percentile(vec![65.0, 58.0, 52.0], 58.0), 25.0);
        assert_eq!(first_match_percentile(vec![65.0, 58.0, 52.0], 99.0), 75.0);
        assert_eq!(first_match_percentile(vec![], 10.0), 0.0);
    }

    #[test]
    fn test_compare_against_reference() {
        let result = compare(&subject(90.0, 80.0, 60.0), 40.0, BaselineCohort::reference());
        assert_eq!(result.hype_multiplier, 2.0);
        assert_eq!(result.certainty_deviation, 22.0);
        assert_eq!(result.technical_deviation, -12.0);
        // accuracy 40 is lowest of [40, 52, 58, 65]
        assert_eq!(result.accuracy_percentile, 0.0);
        // gaps: [-30, 0, 20, 40] -> subject gap 40 at index 3
        assert_eq!(result.calibration_percentile, 75.0);
    }

    #[test]
    fn test_hype_multiplier_floor_divisor() {
        let cohort = BaselineCohort {
            entries: vec![entry("calm", "Calm", [0.2, 50.0, 50.0, 50.0], 50.0)],
        };
        let result = compare(&subject(3.0, 50.0, 50.0), 50.0, &cohort);
        assert_eq!(result.hype_multiplier, 3.0);
    }

    #[test]
    fn test_hype_multiplier_rounding() {
        let result = compare(&subject(30.0, 58.0, 72.0), 58.0, BaselineCohort::reference());
        assert_eq!(result.hype_multiplier, 0.67);
        assert_eq!(result.certainty_deviation, 0.0);
    }

    #[test]
    fn test_empty_cohort() {
        let result = compare(&subject(20.0, 40.0, 30.0), 70.0, &BaselineCohort::default());
        assert_eq!(result.baseline_stats.cohort_size, 0);
        assert_eq!(result.hype_multiplier, 20.0);
        assert_eq!(result.accuracy_percentile, 0.0);
    }

    #[test]
    fn test_cohort_from_toml() {
        let content = r#"
[[entries]]
key = "a"
name = "Analyst A"
historical_accuracy = 70.0
metrics = { emotional_intensity = 10.0, certainty_index = 30.0, technical_depth = 80.0, prediction_density = 20.0 }

[[entries]]
key = "b"
name = "Analyst B"
historical_accuracy = 40.0
metrics = { emotional_intensity = 90.0, certainty_index = 95.0, technical_depth = 10.0, prediction_density = 90.0 }
"#;
        let cohort = BaselineCohort::from_toml_str(content).unwrap();
        assert_eq!(cohort.len(), 2);
        // lower-middle of two elements is the larger one
        assert_eq!(cohort.stats().median_emotional_intensity, 90.0);
        assert!(BaselineCohort::from_toml_str("entries = 5").is_err());
    }
}
