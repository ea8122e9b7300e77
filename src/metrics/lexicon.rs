//! Marker vocabularies for the metrics extractor
//!
//! Terms are matched as lowercase substrings, so multi-word phrases
//! ("funding rate") and partial words ("rocket" inside "skyrocket") both
//! count. Each list holds distinct terms.

use regex::Regex;
use std::sync::OnceLock;

const INTENSITY_TERMS: &[&str] = &[
    "massive", "explosive", "crash", "moon", "guaranteed", "insane",
    "never", "always", "huge", "enormous", "catastrophic", "incredible",
    "unbelievable", "shocking", "extreme", "violent", "brutal", "devastating",
    "parabolic", "exponential", "rocket", "skyrocket", "plummet", "collapse",
];

const HIGH_CERTAINTY_TERMS: &[&str] = &[
    "will", "guaranteed", "definitely", "certain", "surely", "absolutely",
    "without doubt", "no doubt", "100%", "must", "inevitable", "obviously",
];

const HEDGE_TERMS: &[&str] = &[
    "might", "could", "possibly", "perhaps", "maybe", "probably",
    "likely", "uncertain", "unclear", "potentially", "may", "seems",
    "appears", "suggests", "indicates", "could be", "might be",
];

const TECHNICAL_TERMS: &[&str] = &[
    "on-chain", "liquidity", "derivatives", "gamma", "basis", "arbitrage",
    "orderbook", "order book", "volatility", "correlation", "hedge",
    "futures", "perpetual", "funding rate", "open interest", "options",
    "delta", "implied volatility", "mark price", "index price",
    "liquidation", "leverage", "margin", "collateral", "defi", "tvl",
    "smart contract", "validator", "consensus", "hash rate", "difficulty",
    "mempool", "block", "transaction", "gas", "wei", "gwei", "slippage",
    "impermanent loss", "yield farming", "staking", "proof of stake",
    "proof of work", "eip", "fork", "halving", "difficulty adjustment",
];

const PREDICTION_PATTERNS: &[&str] = &[
    r"\b(?:will|gonna|going to)\s+(?:hit|reach|go to|be|see)\s+[\$\d]",
    r"\$?\d+[kKmMbB]?\s+(?:by|before|within)\s+(?:next|the|end)",
    r"(?:bullish|bearish)\s+(?:for|on|into)\s+\d{4}",
    r"expect\s+\w+\s+to\s+(?:hit|reach|go)",
    r"predict\s+\w+\s+(?:will|to)",
    r"(?:we're|we are)\s+(?:going|headed)\s+(?:to|for|towards)",
];

/// Term categories matched by substring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermCategory {
    Intensity,
    HighCertainty,
    Hedge,
    Technical,
}

impl TermCategory {
    pub fn all() -> &'static [TermCategory] {
        &[
            TermCategory::Intensity,
            TermCategory::HighCertainty,
            TermCategory::Hedge,
            TermCategory::Technical,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TermCategory::Intensity => "intensity",
            TermCategory::HighCertainty => "high_certainty",
            TermCategory::Hedge => "hedge",
            TermCategory::Technical => "technical",
        }
    }
}

/// Immutable marker tables used by [`super::MetricsExtractor`]
#[derive(Debug, Clone)]
pub struct Lexicon {
    intensity: Vec<&'static str>,
    high_certainty: Vec<&'static str>,
    hedge: Vec<&'static str>,
    technical: Vec<&'static str>,
    prediction_patterns: Vec<Regex>,
}

static ENGLISH: OnceLock<Lexicon> = OnceLock::new();

impl Lexicon {
    /// Build a lexicon from explicit tables. Patterns are compiled
    /// case-insensitively.
    pub fn new(
        intensity: Vec<&'static str>,
        high_certainty: Vec<&'static str>,
        hedge: Vec<&'static str>,
        technical: Vec<&'static str>,
        prediction_patterns: &[&str],
    ) -> Result<Self, regex::Error> {
        let prediction_patterns = prediction_patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            intensity,
            high_certainty,
            hedge,
            technical,
            prediction_patterns,
        })
    }

    /// The built-in English lexicon, compiled once per process.
    pub fn english() -> &'static Lexicon {
        ENGLISH.get_or_init(|| {
            Lexicon::new(
                INTENSITY_TERMS.to_vec(),
                HIGH_CERTAINTY_TERMS.to_vec(),
                HEDGE_TERMS.to_vec(),
                TECHNICAL_TERMS.to_vec(),
                PREDICTION_PATTERNS,
            )
            .expect("built-in prediction patterns are valid")
        })
    }

    pub fn terms(&self, category: TermCategory) -> &[&'static str] {
        match category {
            TermCategory::Intensity => &self.intensity,
            TermCategory::HighCertainty => &self.high_certainty,
            TermCategory::Hedge => &self.hedge,
            TermCategory::Technical => &self.technical,
        }
    }

    pub fn prediction_patterns(&self) -> &[Regex] {
        &self.prediction_patterns
    }

    /// Number of distinct terms of `category` present in `lowered`.
    ///
    /// `lowered` must already be lowercase.
    pub fn count_distinct(&self, category: TermCategory, lowered: &str) -> usize {
        self.terms(category)
            .iter()
            .filter(|term| lowered.contains(**term))
            .count()
    }

    /// Total non-overlapping prediction matches across all patterns.
    pub fn count_predictions(&self, text: &str) -> usize {
        self.prediction_patterns
            .iter()
            .map(|re| re.find_iter(text).count())
            .sum()
    }

    pub fn is_prediction(&self, text: &str) -> bool {
        self.prediction_patterns.iter().any(|re| re.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tables_hold_distinct_terms() {
        let lexicon = Lexicon::english();
        for category in TermCategory::all() {
            let terms = lexicon.terms(*category);
            let unique: HashSet<_> = terms.iter().collect();
            assert_eq!(unique.len(), terms.len(), "{} has duplicates", category.name());
            assert!(terms.iter().all(|t| *t == t.to_lowercase()));
        }
        assert_eq!(lexicon.prediction_patterns().len(), 6);
    }

    #[test]
    fn test_count_distinct_ignores_frequency() {
        let lexicon = Lexicon::english();
        let text = "moon moon moon and a massive crash";
        assert_eq!(lexicon.count_distinct(TermCategory::Intensity, text), 3);
    }

    #[test]
    fn test_count_distinct_matches_substrings() {
        let lexicon = Lexicon::english();
        // "skyrocket" also contains "rocket"
        assert_eq!(lexicon.count_distinct(TermCategory::Intensity, "skyrocketing"), 2);
        assert_eq!(
            lexicon.count_distinct(TermCategory::Technical, "the funding rate flipped"),
            1
        );
    }

    #[test]
    fn test_prediction_patterns_case_insensitive() {
        let lexicon = Lexicon::english();
        assert!(lexicon.is_prediction("Bitcoin WILL HIT $100k"));
        assert!(lexicon.is_prediction("I'm bullish for 2025"));
        assert!(lexicon.is_prediction("We're headed towards a reset"));
        assert!(!lexicon.is_prediction("the weather is nice"));
    }

    #[test]
    fn test_count_predictions_sums_patterns() {
        let lexicon = Lexicon::english();
        let text = "It will hit $50 soon. Then it will reach 60. I expect eth to go higher.";
        assert_eq!(lexicon.count_predictions(text), 3);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = Lexicon::new(vec![], vec![], vec![], vec![], &["(unclosed"]);
        assert!(result.is_err());
    }
}
