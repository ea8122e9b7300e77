//! Channel analysis orchestration
//!
//! ```text
//! catalog -> cap to max_videos -> transcribe each (failures recorded)
//!         -> join transcripts -> extract metrics + evidence
//!         -> score + compare to baseline -> narrate -> persist
//! ```
//!
//! [`Assessor`] is the pure part (one transcript in, one result out).
//! [`Analyzer`] wraps it with video acquisition and storage.

use crate::ai::{narrate_with_fallback, NarrativeContext, Narrator};
use crate::baseline::{compare, BaselineCohort};
use crate::config::DEFAULT_MAX_VIDEOS;
use crate::metrics::{Lexicon, MetricsExtractor};
use crate::models::{AnalysisResult, AnalysisSummary, VideoFailure, VideoMetadata};
use crate::scoring::score;
use crate::sources::{collect_transcripts, SourceError, TranscriptSource, VideoCatalog, VideoOutcome};
use crate::storage::{ResultStore, StorageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Stored name when the caller does not supply one
pub const UNKNOWN_INFLUENCER: &str = "Unknown";

/// How the narrative refers to an unnamed speaker
pub const UNNAMED_SPEAKER: &str = "This Influencer";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Channel id must not be empty")]
    EmptyChannelId,

    #[error("max_videos must be at least 1")]
    ZeroMaxVideos,

    #[error("Failed to list videos for channel {channel_id}: {source}")]
    Catalog {
        channel_id: String,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One channel analysis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub channel_id: String,
    #[serde(default, alias = "name")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub max_videos: Option<usize>,
}

impl AnalysisRequest {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            display_name: None,
            max_videos: None,
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn max_videos(mut self, max: usize) -> Self {
        self.max_videos = Some(max);
        self
    }

    fn influencer_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Scores a single transcript: extraction, scoring, baseline and narrative
pub struct Assessor {
    lexicon: &'static Lexicon,
    cohort: BaselineCohort,
    narrator: Option<Box<dyn Narrator>>,
}

impl Default for Assessor {
    fn default() -> Self {
        Self::new(BaselineCohort::reference().clone())
    }
}

impl Assessor {
    pub fn new(cohort: BaselineCohort) -> Self {
        Self {
            lexicon: Lexicon::english(),
            cohort,
            narrator: None,
        }
    }

    /// Use a live narrator; the template is still used when it fails.
    pub fn with_narrator(mut self, narrator: Box<dyn Narrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn cohort(&self) -> &BaselineCohort {
        &self.cohort
    }

    /// Assess one transcript. The summary counts it as a single video when
    /// it contains any words. A missing or blank name is stored as
    /// [`UNKNOWN_INFLUENCER`] and narrated as [`UNNAMED_SPEAKER`].
    pub fn assess(
        &self,
        influencer_name: Option<&str>,
        channel_id: &str,
        transcript: &str,
        historical_accuracy: f64,
    ) -> AnalysisResult {
        let (metrics, evidence) = MetricsExtractor::new(self.lexicon).extract(transcript);
        let credibility = score(&metrics, historical_accuracy);
        let baseline_comparison = compare(&metrics, historical_accuracy, &self.cohort);
        let name = influencer_name.map(str::trim).filter(|n| !n.is_empty());

        let explanation = narrate_with_fallback(
            self.narrator.as_deref(),
            &NarrativeContext {
                influencer_name: name.unwrap_or(UNNAMED_SPEAKER),
                metrics: &metrics,
                credibility: &credibility,
                baseline: &baseline_comparison,
                evidence: &evidence,
                historical_accuracy,
            },
        );

        let total_words = transcript.split_whitespace().count();
        AnalysisResult {
            influencer_name: name.unwrap_or(UNKNOWN_INFLUENCER).to_string(),
            channel_id: channel_id.to_string(),
            analysis_summary: AnalysisSummary {
                videos_analyzed: usize::from(total_words > 0),
                videos_failed: 0,
                total_words,
            },
            metrics,
            credibility,
            historical_accuracy,
            baseline_comparison,
            evidence,
            explanation,
            video_metadata: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Full channel analysis with video acquisition and persistence
pub struct Analyzer {
    assessor: Assessor,
    catalog: Box<dyn VideoCatalog>,
    transcripts: Box<dyn TranscriptSource>,
    store: ResultStore,
    default_max_videos: usize,
    persist: bool,
}

impl Analyzer {
    pub fn new(
        assessor: Assessor,
        catalog: Box<dyn VideoCatalog>,
        transcripts: Box<dyn TranscriptSource>,
        store: ResultStore,
    ) -> Self {
        Self {
            assessor,
            catalog,
            transcripts,
            store,
            default_max_videos: DEFAULT_MAX_VIDEOS,
            persist: true,
        }
    }

    /// Cap used when a request does not name one
    pub fn default_max_videos(mut self, max: usize) -> Self {
        self.default_max_videos = max;
        self
    }

    /// Skip saving results (accuracy records are still read)
    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn assessor(&self) -> &Assessor {
        &self.assessor
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, PipelineError> {
        let channel_id = request.channel_id.trim();
        if channel_id.is_empty() {
            return Err(PipelineError::EmptyChannelId);
        }
        if request.max_videos == Some(0) {
            return Err(PipelineError::ZeroMaxVideos);
        }
        let max_videos = request.max_videos.unwrap_or(self.default_max_videos);

        let mut videos = self
            .catalog
            .list_videos(channel_id, max_videos)
            .map_err(|source| PipelineError::Catalog {
                channel_id: channel_id.to_string(),
                source,
            })?;
        videos.truncate(max_videos);
        info!("Analyzing {} video(s) for channel {}", videos.len(), channel_id);

        let outcomes = collect_transcripts(self.transcripts.as_ref(), &videos);

        let mut transcripts = Vec::new();
        let mut video_metadata = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                VideoOutcome::Transcribed { video, transcript } => {
                    video_metadata.push(VideoMetadata {
                        video_id: video.video_id,
                        title: video.title,
                        word_count: transcript.split_whitespace().count(),
                    });
                    transcripts.push(transcript);
                }
                VideoOutcome::Failed { video, reason } => failures.push(VideoFailure {
                    video_id: video.video_id,
                    reason,
                }),
            }
        }

        if transcripts.is_empty() {
            warn!(
                "No transcripts available for {} ({} video(s) failed); metrics will be zero",
                channel_id,
                failures.len()
            );
        }

        let combined = transcripts.join(" ");
        let historical_accuracy = self.store.historical_accuracy(channel_id)?;

        let mut result = self.assessor.assess(
            request.influencer_name(),
            channel_id,
            &combined,
            historical_accuracy,
        );
        result.analysis_summary = AnalysisSummary {
            videos_analyzed: video_metadata.len(),
            videos_failed: failures.len(),
            total_words: video_metadata.iter().map(|v| v.word_count).sum(),
        };
        result.video_metadata = video_metadata;
        result.failures = failures;

        if self.persist {
            self.store.save_result(&result)?;
        }

        info!(
            "Credibility for {}: {}/100",
            channel_id, result.credibility.credibility_score
        );
        Ok(result)
    }
}
