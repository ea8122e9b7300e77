//! Narrative generation with a deterministic fallback

use super::client::AiClient;
use super::prompts::{ExplanationPromptBuilder, SYSTEM_PROMPT};
use super::AiResult;
use crate::models::{
    BaselineComparison, CredibilityResult, Evidence, Explanation, ExplanationSource, MetricSet,
};
use crate::scoring::Calibration;
use tracing::{debug, warn};

/// Everything a narrator may draw on. Borrowed from the finished analysis.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeContext<'a> {
    pub influencer_name: &'a str,
    pub metrics: &'a MetricSet,
    pub credibility: &'a CredibilityResult,
    pub baseline: &'a BaselineComparison,
    pub evidence: &'a Evidence,
    pub historical_accuracy: f64,
}

/// Produces prose explaining a credibility verdict
pub trait Narrator {
    fn source(&self) -> ExplanationSource;

    fn explain(&self, ctx: &NarrativeContext<'_>) -> AiResult<String>;
}

/// Narrator backed by a live LLM
pub struct LlmNarrator {
    client: AiClient,
}

impl LlmNarrator {
    pub fn new(client: AiClient) -> Self {
        Self { client }
    }
}

impl Narrator for LlmNarrator {
    fn source(&self) -> ExplanationSource {
        ExplanationSource::Llm
    }

    fn explain(&self, ctx: &NarrativeContext<'_>) -> AiResult<String> {
        let prompt = ExplanationPromptBuilder::new(ctx).build();
        debug!(
            "Requesting explanation from {:?} ({})",
            self.client.backend(),
            self.client.model()
        );
        let text = self.client.generate(&prompt, Some(SYSTEM_PROMPT))?;
        Ok(text.trim().to_string())
    }
}

/// Deterministic summary derived from the score and calibration gap
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    pub fn render(&self, credibility: &CredibilityResult) -> String {
        format!(
            "Credibility score: {:.1}/100. Calibration gap of {:.1} suggests {}. \
             Analysis service temporarily unavailable.",
            credibility.credibility_score,
            credibility.calibration_gap,
            Calibration::from_gap(credibility.calibration_gap).describe()
        )
    }
}

impl Narrator for TemplateNarrator {
    fn source(&self) -> ExplanationSource {
        ExplanationSource::Template
    }

    fn explain(&self, ctx: &NarrativeContext<'_>) -> AiResult<String> {
        Ok(self.render(ctx.credibility))
    }
}

/// Explain with `primary` when available; fall back to the template on any
/// failure. Always returns a verdict.
pub fn narrate_with_fallback(
    primary: Option<&dyn Narrator>,
    ctx: &NarrativeContext<'_>,
) -> Explanation {
    if let Some(narrator) = primary {
        match narrator.explain(ctx) {
            Ok(text) if !text.is_empty() => {
                return Explanation {
                    text,
                    source: narrator.source(),
                }
            }
            Ok(_) => warn!("Narrator returned an empty explanation, using template"),
            Err(e) => warn!("Explanation generation failed, using template: {}", e),
        }
    }

    Explanation {
        text: TemplateNarrator.render(ctx.credibility),
        source: ExplanationSource::Template,
    }
}
