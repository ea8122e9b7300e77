//! Credibility scorer

use crate::models::{clamp_pct, round_to, CredibilityFlags, CredibilityResult, MetricSet};
use tracing::debug;

const WEIGHT_ACCURACY: f64 = 0.40;
const WEIGHT_CALM: f64 = 0.25;
const WEIGHT_TECHNICAL: f64 = 0.20;
const WEIGHT_PREDICTION_BALANCE: f64 = 0.15;

/// Gap above which the heavy penalty applies
const SEVERE_GAP: f64 = 30.0;
/// Gap above which the light penalty applies
const MODERATE_GAP: f64 = 15.0;

/// Coarse reading of a calibration gap, used by narrative fallbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calibration {
    Overconfident,
    Reasonable,
}

impl Calibration {
    pub fn from_gap(gap: f64) -> Self {
        if gap > 20.0 {
            Calibration::Overconfident
        } else {
            Calibration::Reasonable
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Calibration::Overconfident => "overconfidence",
            Calibration::Reasonable => "reasonable calibration",
        }
    }
}

/// Step penalty for a calibration gap. Boundaries belong to the lower step.
pub fn calibration_penalty(gap: f64) -> u8 {
    if gap > SEVERE_GAP {
        20
    } else if gap > MODERATE_GAP {
        10
    } else {
        0
    }
}

/// Score a metric set against the subject's historical accuracy (0-100).
pub fn score(metrics: &MetricSet, historical_accuracy: f64) -> CredibilityResult {
    let emotional = metrics.emotional_intensity;
    let certainty = metrics.certainty_index;
    let technical = metrics.technical_depth;
    let predictions = metrics.prediction_density;

    let gap = certainty - historical_accuracy;
    let penalty = calibration_penalty(gap);

    let raw = historical_accuracy * WEIGHT_ACCURACY
        + (100.0 - emotional) * WEIGHT_CALM
        + technical * WEIGHT_TECHNICAL
        + (100.0 - (predictions - 50.0).abs()) * WEIGHT_PREDICTION_BALANCE
        - f64::from(penalty);

    let flags = CredibilityFlags {
        high_hype_low_accuracy: emotional > 70.0 && historical_accuracy < 50.0,
        overconfident: gap > SEVERE_GAP,
        technical_but_inaccurate: technical > 60.0 && historical_accuracy < 45.0,
        hedges_appropriately: certainty < 40.0 && historical_accuracy > 60.0,
        extreme_prediction_volume: predictions > 80.0,
        calm_and_accurate: emotional < 40.0 && historical_accuracy > 65.0,
    };

    debug!(
        "Credibility: raw={:.2}, gap={:.1}, penalty={}, flags={:?}",
        raw,
        gap,
        penalty,
        flags.active()
    );

    CredibilityResult {
        credibility_score: round_to(clamp_pct(raw), 1),
        calibration_gap: round_to(gap, 1),
        calibration_penalty: penalty,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(ei: f64, ci: f64, td: f64, pd: f64) -> MetricSet {
        MetricSet {
            emotional_intensity: ei,
            certainty_index: ci,
            technical_depth: td,
            prediction_density: pd,
            word_count: 1000,
        }
    }

    #[test]
    fn test_penalty_boundaries() {
        assert_eq!(calibration_penalty(30.0), 10);
        assert_eq!(calibration_penalty(30.01), 20);
        assert_eq!(calibration_penalty(15.0), 0);
        assert_eq!(calibration_penalty(15.01), 10);
        assert_eq!(calibration_penalty(-80.0), 0);
    }

    #[test]
    fn test_penalty_from_gap_in_result() {
        let result = score(&metrics(50.0, 80.0, 50.0, 50.0), 50.0);
        assert_eq!(result.calibration_gap, 30.0);
        assert_eq!(result.calibration_penalty, 10);
        assert!(!result.flags.overconfident);

        let result = score(&metrics(50.0, 65.0, 50.0, 50.0), 50.0);
        assert_eq!(result.calibration_gap, 15.0);
        assert_eq!(result.calibration_penalty, 0);
    }

    #[test]
    fn test_weighted_formula() {
        // 0.4*60 + 0.25*80 + 0.2*50 + 0.15*90 = 24 + 20 + 10 + 13.5
        let result = score(&metrics(20.0, 50.0, 50.0, 60.0), 60.0);
        assert_eq!(result.calibration_penalty, 0);
        assert_eq!(result.credibility_score, 67.5);
    }

    #[test]
    fn test_score_clamped_low() {
        // 0 + 0 + 0 + 0.15*50 - 20 = -12.5
        let result = score(&metrics(100.0, 100.0, 0.0, 100.0), 0.0);
        assert_eq!(result.calibration_penalty, 20);
        assert_eq!(result.credibility_score, 0.0);
        assert_eq!(result.calibration_gap, 100.0);
    }

    #[test]
    fn test_score_upper_bound() {
        let result = score(&metrics(0.0, 0.0, 100.0, 50.0), 100.0);
        assert_eq!(result.credibility_score, 100.0);
        assert_eq!(result.calibration_gap, -100.0);
    }

    #[test]
    fn test_score_always_in_range() {
        for ei in [0.0, 35.0, 100.0] {
            for ci in [0.0, 50.0, 100.0] {
                for acc in [0.0, 50.0, 100.0] {
                    let result = score(&metrics(ei, ci, 100.0 - ei, ci), acc);
                    assert!((0.0..=100.0).contains(&result.credibility_score));
                }
            }
        }
    }

    #[test]
    fn test_overconfident_flag_tracks_gap_only() {
        let result = score(&metrics(10.0, 90.0, 10.0, 10.0), 59.0);
        assert!(result.flags.overconfident);
        let result = score(&metrics(10.0, 90.0, 10.0, 10.0), 60.0);
        assert!(!result.flags.overconfident);
    }

    #[test]
    fn test_flag_conditions() {
        let hype = score(&metrics(75.0, 50.0, 65.0, 85.0), 40.0);
        assert!(hype.flags.high_hype_low_accuracy);
        assert!(hype.flags.technical_but_inaccurate);
        assert!(hype.flags.extreme_prediction_volume);
        assert!(!hype.flags.calm_and_accurate);
        assert!(!hype.flags.hedges_appropriately);

        let calm = score(&metrics(30.0, 35.0, 40.0, 40.0), 70.0);
        assert!(calm.flags.calm_and_accurate);
        assert!(calm.flags.hedges_appropriately);
        assert!(!calm.flags.high_hype_low_accuracy);
        assert!(!calm.flags.overconfident);
        assert_eq!(calm.flags.active().len(), 2);
    }

    #[test]
    fn test_calibration_reading() {
        assert_eq!(Calibration::from_gap(20.0), Calibration::Reasonable);
        assert_eq!(Calibration::from_gap(20.5), Calibration::Overconfident);
        assert_eq!(Calibration::Overconfident.describe(), "overconfidence");
    }
}
