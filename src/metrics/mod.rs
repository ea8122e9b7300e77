//! Lexical metrics extraction
//!
//! Converts transcript text into four normalized sub-scores and a bundle of
//! supporting quotes.
//!
//! # Sub-scores
//!
//! ```text
//! Emotional intensity = min(100, distinct_intensity / words × 1000 / 8.0  × 100)
//! Certainty index     = certain / (certain + hedged) × 100   (50 if neither)
//! Technical depth     = min(100, distinct_technical / words × 1000 / 10.0 × 50)
//! Prediction density  = min(100, prediction_matches / words × 1000 / 5.0  × 100)
//! ```
//!
//! Intensity, certainty and technical depth are *coverage* metrics: a term
//! counts once no matter how often it occurs. Prediction density counts every
//! regex match.

mod extractor;
mod lexicon;

pub use extractor::{split_sentences, MetricsExtractor};
pub use lexicon::{Lexicon, TermCategory};
