//! End-to-end library tests with in-memory collaborators

use credence::ai::{AiError, AiResult, NarrativeContext, Narrator};
use credence::baseline::BaselineCohort;
use credence::models::ExplanationSource;
use credence::pipeline::{AnalysisRequest, Analyzer, Assessor};
use credence::sources::{SourceError, SourceResult, StaticCatalog, TranscriptSource, VideoRef};
use credence::storage::ResultStore;
use std::cell::Cell;

struct CannedTranscripts;

impl TranscriptSource for CannedTranscripts {
    fn fetch(&self, video: &VideoRef) -> SourceResult<String> {
        match video.video_id.as_str() {
            "calm01" => Ok("The on-chain data suggests liquidity could improve. \
                Funding rate and open interest look balanced, perhaps a slow grind."
                .into()),
            "hype02" => Ok("This will definitely moon! Guaranteed massive explosive gains. \
                Bitcoin will hit $200k by next year."
                .into()),
            other => Err(SourceError::NotFound(format!("no captions for {other}"))),
        }
    }
}

/// Echoes the score so the test can check what the narrator saw
struct EchoNarrator {
    calls: Cell<usize>,
}

impl Narrator for EchoNarrator {
    fn source(&self) -> ExplanationSource {
        ExplanationSource::Llm
    }

    fn explain(&self, ctx: &NarrativeContext<'_>) -> AiResult<String> {
        self.calls.set(self.calls.get() + 1);
        Ok(format!(
            "{} scored {}",
            ctx.influencer_name, ctx.credibility.credibility_score
        ))
    }
}

struct DownNarrator;

impl Narrator for DownNarrator {
    fn source(&self) -> ExplanationSource {
        ExplanationSource::Llm
    }

    fn explain(&self, _ctx: &NarrativeContext<'_>) -> AiResult<String> {
        Err(AiError::ApiError {
            status: 503,
            message: "unavailable".into(),
        })
    }
}

fn catalog() -> Box<StaticCatalog> {
    Box::new(StaticCatalog::from_urls(&[
        "https://www.youtube.com/watch?v=calm01",
        "https://www.youtube.com/watch?v=gone99",
        "https://www.youtube.com/watch?v=hype02",
    ]))
}

#[test]
fn test_full_analysis_with_live_narrator() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::new(dir.path());
    store.save_historical_accuracy("UCmix", 45.0).unwrap();

    let assessor = Assessor::default().with_narrator(Box::new(EchoNarrator {
        calls: Cell::new(0),
    }));
    let analyzer = Analyzer::new(assessor, catalog(), Box::new(CannedTranscripts), store);

    let result = analyzer
        .analyze(&AnalysisRequest::new("UCmix").display_name("Mixed Signals"))
        .unwrap();

    assert_eq!(result.analysis_summary.videos_analyzed, 2);
    assert_eq!(result.analysis_summary.videos_failed, 1);
    assert_eq!(result.failures[0].video_id, "gone99");
    assert_eq!(result.historical_accuracy, 45.0);
    assert_eq!(result.explanation.source, ExplanationSource::Llm);
    assert_eq!(
        result.explanation.text,
        format!("Mixed Signals scored {}", result.credibility.credibility_score)
    );
    assert_eq!(result.baseline_comparison.baseline_stats.cohort_size, 3);
    assert!(!result.evidence.certainty_quotes.is_empty());

    let stored = analyzer.store().get_result("UCmix").unwrap().unwrap();
    assert_eq!(stored.result, result);
}

#[test]
fn test_narrator_failure_falls_back_to_template() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = Analyzer::new(
        Assessor::default().with_narrator(Box::new(DownNarrator)),
        catalog(),
        Box::new(CannedTranscripts),
        ResultStore::new(dir.path()),
    );

    let result = analyzer.analyze(&AnalysisRequest::new("UCdown")).unwrap();
    assert_eq!(result.explanation.source, ExplanationSource::Template);
    assert!(result
        .explanation
        .text
        .starts_with(&format!("Credibility score: {}/100.", result.credibility.credibility_score)));
}

#[test]
fn test_custom_cohort_changes_comparison() {
    let cohort = BaselineCohort::from_toml_str(
        r#"
[[entries]]
key = "steady"
name = "Steady Analyst"
historical_accuracy = 70.0

[entries.metrics]
emotional_intensity = 10.0
certainty_index = 40.0
technical_depth = 80.0
prediction_density = 20.0
"#,
    )
    .unwrap();

    let assessor = Assessor::new(cohort);
    let result = assessor.assess(Some("Solo"), "UCsolo", "Maybe it could rise, perhaps.", 50.0);
    let stats = result.baseline_comparison.baseline_stats;
    assert_eq!(stats.cohort_size, 1);
    assert_eq!(stats.median_emotional_intensity, 10.0);
    // 50 sits below the single cohort accuracy of 70
    assert_eq!(result.baseline_comparison.accuracy_percentile, 0.0);
}
