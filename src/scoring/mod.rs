//! Composite credibility scoring
//!
//! Folds the four lexical sub-scores together with an externally supplied
//! historical-accuracy value.
//!
//! # Scoring Formula
//!
//! ```text
//! gap     = certainty_index - historical_accuracy
//! penalty = 20 if gap > 30, 10 if gap > 15, else 0
//!
//! Score = 0.40 × accuracy
//!       + 0.25 × (100 - emotional_intensity)
//!       + 0.20 × technical_depth
//!       + 0.15 × (100 - |prediction_density - 50|)
//!       - penalty                                   (clamped to 0..100)
//! ```
//!
//! The weights sum to 1.0; the penalty is a flat deduction so a large
//! certainty/accuracy gap costs more than any single metric can earn back.

mod credibility;

pub use credibility::{calibration_penalty, score, Calibration};
