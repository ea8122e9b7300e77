//! Prompt construction for credibility explanations

use super::narrator::NarrativeContext;
use regex::Regex;
use std::sync::OnceLock;

/// Quotes per evidence category shown to the model
const QUOTES_PER_CATEGORY: usize = 3;
const MAX_QUOTE_CHARS: usize = 300;

pub const SYSTEM_PROMPT: &str = "You are an analyst assessing the credibility of market \
commentators from quantified transcript metrics. You are analytical, not judgmental, \
and you never invent numbers that were not provided.";

/// Builder for the explanation prompt
pub struct ExplanationPromptBuilder<'a> {
    ctx: &'a NarrativeContext<'a>,
    max_words: usize,
}

impl<'a> ExplanationPromptBuilder<'a> {
    pub fn new(ctx: &'a NarrativeContext<'a>) -> Self {
        Self { ctx, max_words: 200 }
    }

    pub fn max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn build(self) -> String {
        let ctx = self.ctx;
        let m = ctx.metrics;
        let cred = ctx.credibility;
        let base = ctx.baseline;

        format!(
            r#"You are analyzing the credibility of crypto influencer "{name}".

You have been provided with QUANTIFIED METRICS, not subjective opinions:

**CORE METRICS:**
- Emotional Intensity: {ei}/100 (higher = more hype language)
- Certainty Index: {ci}/100 (higher = more certain language)
- Technical Depth: {td}/100 (higher = more technical)
- Prediction Density: {pd}/100 (frequency of predictions)
- Historical Accuracy: {acc}/100 (verified prediction success rate)

**CREDIBILITY SCORE: {score}/100**

**CALIBRATION GAP: {gap}**
(This is Certainty Index minus Historical Accuracy. Large positive gaps indicate overconfidence.)

**BASELINE COMPARISON:**
- {hype}x the emotional intensity of median baseline influencer
- Certainty is {cdev:+.0} points vs baseline median
- Historical accuracy is at the {apct:.0}th percentile
- Calibration gap is at the {cpct:.0}th percentile

**ACTIVE FLAGS:**
{flags}

**SAMPLE EVIDENCE:**
High-certainty quotes: {certainty_quotes}
High-intensity quotes: {intensity_quotes}
Technical quotes: {technical_quotes}

---

Write a credibility analysis that:
1. Explains what the credibility score means (2-3 sentences)
2. Identifies key strengths (if any)
3. Identifies key weaknesses (if any)
4. Contextualizes them vs baseline influencers
5. Focuses on CALIBRATION: does their confidence match their accuracy?

Be analytical, not judgmental. Be concise (under {max_words} words). No bullet points. Write in clear prose.
"#,
            name = sanitize_text(ctx.influencer_name),
            ei = m.emotional_intensity,
            ci = m.certainty_index,
            td = m.technical_depth,
            pd = m.prediction_density,
            acc = ctx.historical_accuracy,
            score = cred.credibility_score,
            gap = cred.calibration_gap,
            hype = base.hype_multiplier,
            cdev = base.certainty_deviation,
            apct = base.accuracy_percentile,
            cpct = base.calibration_percentile,
            flags = cred.flags.describe(),
            certainty_quotes = format_quotes(&ctx.evidence.certainty_quotes),
            intensity_quotes = format_quotes(&ctx.evidence.intensity_quotes),
            technical_quotes = format_quotes(&ctx.evidence.technical_quotes),
            max_words = self.max_words,
        )
    }
}

fn format_quotes(quotes: &[String]) -> String {
    if quotes.is_empty() {
        return "none".to_string();
    }
    quotes
        .iter()
        .take(QUOTES_PER_CATEGORY)
        .map(|q| format!("\"{}\"", sanitize_text(q)))
        .collect::<Vec<_>>()
        .join("; ")
}

static INJECTION_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn injection_patterns() -> &'static [Regex] {
    INJECTION_PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(?i)ignore\s+(all\s+)?previous\s+instructions?").expect("valid regex"),
            Regex::new(r"(?i)disregard\s+(all\s+)?previous").expect("valid regex"),
            Regex::new(r"(?i)forget\s+(all\s+)?previous").expect("valid regex"),
            Regex::new(r"(?i)system\s*:\s*").expect("valid regex"),
            Regex::new(r"(?i)<\s*system\s*>").expect("valid regex"),
            Regex::new(r"(?i)assistant\s*:\s*").expect("valid regex"),
            Regex::new(r"(?i)human\s*:\s*").expect("valid regex"),
        ]
    })
}

/// Neutralize prompt-injection phrases in transcript text and cap its length.
///
/// Transcripts are third-party speech, so quotes are never trusted verbatim.
pub fn sanitize_text(text: &str) -> String {
    let mut result = text.to_string();
    for pattern in injection_patterns() {
        result = pattern.replace_all(&result, "[REDACTED]").to_string();
    }

    if result.chars().count() > MAX_QUOTE_CHARS {
        result = result.chars().take(MAX_QUOTE_CHARS).collect();
        result.push_str("... [truncated]");
    }

    result
}
