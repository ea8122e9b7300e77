//! Core data models for Credence
//!
//! These records flow from the metrics extractor through scoring and
//! baseline comparison into the assembled analysis result. All of them are
//! plain values: created once per analysis and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Round `value` to `decimals` places (half away from zero).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Clamp a percentage-scale value into [0, 100].
pub fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// The four lexical sub-scores of a transcript plus its size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricSet {
    /// Hype language coverage (0-100)
    pub emotional_intensity: f64,
    /// Share of certainty markers among certainty + hedge markers (0-100)
    pub certainty_index: f64,
    /// Technical vocabulary coverage (0-100)
    pub technical_depth: f64,
    /// Prediction statements per 1000 words, scaled (0-100)
    pub prediction_density: f64,
    pub word_count: usize,
}

/// Sample sentences backing the sub-scores, in transcript order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Evidence {
    pub intensity_quotes: Vec<String>,
    pub certainty_quotes: Vec<String>,
    pub technical_quotes: Vec<String>,
    pub predictions: Vec<String>,
}

impl Evidence {
    pub fn is_empty(&self) -> bool {
        self.intensity_quotes.is_empty()
            && self.certainty_quotes.is_empty()
            && self.technical_quotes.is_empty()
            && self.predictions.is_empty()
    }
}

/// Independent diagnostic flags raised by the credibility scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CredibilityFlags {
    pub high_hype_low_accuracy: bool,
    pub overconfident: bool,
    pub technical_but_inaccurate: bool,
    pub hedges_appropriately: bool,
    pub extreme_prediction_volume: bool,
    pub calm_and_accurate: bool,
}

impl CredibilityFlags {
    /// All flags as `(name, raised)` pairs, in declaration order.
    pub fn entries(&self) -> [(&'static str, bool); 6] {
        [
            ("high_hype_low_accuracy", self.high_hype_low_accuracy),
            ("overconfident", self.overconfident),
            ("technical_but_inaccurate", self.technical_but_inaccurate),
            ("hedges_appropriately", self.hedges_appropriately),
            ("extreme_prediction_volume", self.extreme_prediction_volume),
            ("calm_and_accurate", self.calm_and_accurate),
        ]
    }

    /// Names of the raised flags
    pub fn active(&self) -> Vec<&'static str> {
        self.entries()
            .into_iter()
            .filter(|(_, raised)| *raised)
            .map(|(name, _)| name)
            .collect()
    }

    /// Raised flags as title-cased words, comma separated ("None" if empty).
    pub fn describe(&self) -> String {
        let active: Vec<String> = self.active().into_iter().map(title_case).collect();
        if active.is_empty() {
            "None".to_string()
        } else {
            active.join(", ")
        }
    }
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Composite credibility verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CredibilityResult {
    /// Composite score (0-100)
    pub credibility_score: f64,
    /// Certainty index minus historical accuracy (signed)
    pub calibration_gap: f64,
    /// Flat deduction applied for overconfidence: 0, 10 or 20
    pub calibration_penalty: u8,
    pub flags: CredibilityFlags,
}

/// Cohort medians used as the comparison reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    pub median_emotional_intensity: f64,
    pub median_certainty_index: f64,
    pub median_technical_depth: f64,
    pub median_historical_accuracy: f64,
    pub cohort_size: usize,
}

/// Subject metrics relative to the baseline cohort
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
    /// Emotional intensity as a multiple of the cohort median
    pub hype_multiplier: f64,
    pub certainty_deviation: f64,
    pub technical_deviation: f64,
    pub accuracy_percentile: f64,
    pub calibration_percentile: f64,
    pub baseline_stats: BaselineStats,
}

/// Which narrator produced an explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationSource {
    Llm,
    Template,
}

impl std::fmt::Display for ExplanationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExplanationSource::Llm => write!(f, "llm"),
            ExplanationSource::Template => write!(f, "template"),
        }
    }
}

/// Narrative explanation of a credibility verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
}

/// Per-video bookkeeping for a successful transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub word_count: usize,
}

/// A video that could not be transcribed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFailure {
    pub video_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnalysisSummary {
    pub videos_analyzed: usize,
    pub videos_failed: usize,
    pub total_words: usize,
}

/// Complete result of analyzing one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub influencer_name: String,
    pub channel_id: String,
    pub analysis_summary: AnalysisSummary,
    pub metrics: MetricSet,
    pub credibility: CredibilityResult,
    pub historical_accuracy: f64,
    pub baseline_comparison: BaselineComparison,
    pub evidence: Evidence,
    pub explanation: Explanation,
    #[serde(default)]
    pub video_metadata: Vec<VideoMetadata>,
    #[serde(default)]
    pub failures: Vec<VideoFailure>,
}
