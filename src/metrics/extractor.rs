//! Transcript → metrics + evidence

use super::lexicon::{Lexicon, TermCategory};
use crate::models::{round_to, Evidence, MetricSet};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Assumed 95th-percentile intensity terms per 1000 words
const INTENSITY_BASELINE_PER_1K: f64 = 8.0;
/// Assumed median technical terms per 1000 words
const TECHNICAL_BASELINE_PER_1K: f64 = 10.0;
/// Predictions per 1000 words at which density saturates
const PREDICTION_BASELINE_PER_1K: f64 = 5.0;

const MAX_QUOTES: usize = 5;
const MAX_PREDICTIONS: usize = 10;
const MIN_PREDICTION_CHARS: usize = 20;

static WORD_RE: OnceLock<Regex> = OnceLock::new();
static SENTENCE_END_RE: OnceLock<Regex> = OnceLock::new();

fn word_re() -> &'static Regex {
    WORD_RE.get_or_init(|| Regex::new(r"\b\w+\b").expect("valid regex"))
}

fn sentence_end_re() -> &'static Regex {
    SENTENCE_END_RE.get_or_init(|| Regex::new(r"[.!?]+").expect("valid regex"))
}

/// Split on runs of terminal punctuation. No abbreviation handling.
pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    sentence_end_re().split(text)
}

/// Per-1000-word rate of `count`, divided by `baseline` and scaled by `scale`,
/// capped at 100.
fn scaled_rate(count: usize, word_count: usize, baseline: f64, scale: f64) -> f64 {
    if word_count == 0 {
        return 0.0;
    }
    let per_1k = count as f64 / word_count as f64 * 1000.0;
    (per_1k / baseline * scale).min(100.0)
}

/// Lexical metrics extractor. Stateless; borrows an immutable [`Lexicon`].
#[derive(Debug, Clone, Copy)]
pub struct MetricsExtractor<'a> {
    lexicon: &'a Lexicon,
}

impl Default for MetricsExtractor<'static> {
    fn default() -> Self {
        Self::new(Lexicon::english())
    }
}

impl<'a> MetricsExtractor<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Compute the metric set and supporting evidence for a transcript.
    pub fn extract(&self, transcript: &str) -> (MetricSet, Evidence) {
        let lowered = transcript.to_lowercase();
        let word_count = word_re().find_iter(&lowered).count();

        let metrics = MetricSet {
            emotional_intensity: round_to(self.emotional_intensity(&lowered, word_count), 1),
            certainty_index: round_to(self.certainty_index(&lowered, word_count), 1),
            technical_depth: round_to(self.technical_depth(&lowered, word_count), 1),
            prediction_density: round_to(self.prediction_density(transcript, word_count), 1),
            word_count,
        };
        let evidence = self.evidence(transcript);

        debug!(
            "Extracted metrics: words={}, intensity={}, certainty={}, technical={}, predictions={}",
            metrics.word_count,
            metrics.emotional_intensity,
            metrics.certainty_index,
            metrics.technical_depth,
            metrics.prediction_density
        );

        (metrics, evidence)
    }

    fn emotional_intensity(&self, lowered: &str, word_count: usize) -> f64 {
        let hits = self.lexicon.count_distinct(TermCategory::Intensity, lowered);
        scaled_rate(hits, word_count, INTENSITY_BASELINE_PER_1K, 100.0)
    }

    fn certainty_index(&self, lowered: &str, word_count: usize) -> f64 {
        if word_count == 0 {
            return 0.0;
        }
        let certain = self.lexicon.count_distinct(TermCategory::HighCertainty, lowered);
        let hedged = self.lexicon.count_distinct(TermCategory::Hedge, lowered);
        if certain + hedged == 0 {
            return 50.0;
        }
        certain as f64 / (certain + hedged) as f64 * 100.0
    }

    fn technical_depth(&self, lowered: &str, word_count: usize) -> f64 {
        let terms = self.lexicon.count_distinct(TermCategory::Technical, lowered);
        scaled_rate(terms, word_count, TECHNICAL_BASELINE_PER_1K, 50.0)
    }

    fn prediction_density(&self, transcript: &str, word_count: usize) -> f64 {
        let predictions = self.lexicon.count_predictions(transcript);
        scaled_rate(predictions, word_count, PREDICTION_BASELINE_PER_1K, 100.0)
    }

    /// Collect quotes in a single pass over the original-case sentences.
    fn evidence(&self, transcript: &str) -> Evidence {
        let mut evidence = Evidence::default();

        for sentence in split_sentences(transcript) {
            let trimmed = sentence.trim();
            if trimmed.is_empty() {
                continue;
            }
            let lowered = trimmed.to_lowercase();

            if evidence.intensity_quotes.len() < MAX_QUOTES
                && self.lexicon.count_distinct(TermCategory::Intensity, &lowered) >= 2
            {
                evidence.intensity_quotes.push(trimmed.to_string());
            }
            if evidence.certainty_quotes.len() < MAX_QUOTES
                && self.lexicon.count_distinct(TermCategory::HighCertainty, &lowered) >= 1
            {
                evidence.certainty_quotes.push(trimmed.to_string());
            }
            if evidence.technical_quotes.len() < MAX_QUOTES
                && self.lexicon.count_distinct(TermCategory::Technical, &lowered) >= 2
            {
                evidence.technical_quotes.push(trimmed.to_string());
            }
            if evidence.predictions.len() < MAX_PREDICTIONS
                && trimmed.chars().count() > MIN_PREDICTION_CHARS
                && self.lexicon.is_prediction(trimmed)
                && !evidence.predictions.iter().any(|p| p == trimmed)
            {
                evidence.predictions.push(trimmed.to_string());
            }
        }

        evidence
    }
}
