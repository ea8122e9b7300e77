//! Transcript acquisition
//!
//! A [`VideoCatalog`] names the videos to analyze for a channel and a
//! [`TranscriptSource`] turns each video into text. Videos are processed one
//! at a time; a failure on one video is recorded as a
//! [`VideoOutcome::Failed`] and the rest still contribute.

mod catalog;
mod transcript;

pub use catalog::{parse_video_id, StaticCatalog, YoutubeCatalog};
pub use transcript::{CaptionTranscripts, DirectoryTranscripts, SpeechToText};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while listing or transcribing videos
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Missing YouTube API key: set YOUTUBE_API_KEY or youtube.api_key in config")]
    MissingApiKey,

    #[error("YouTube API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A single video to analyze
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub video_id: String,
    pub title: String,
}

impl VideoRef {
    pub fn new(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
        }
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// Lists the videos to analyze for a channel
pub trait VideoCatalog {
    fn list_videos(&self, channel_id: &str, max_results: usize) -> SourceResult<Vec<VideoRef>>;
}

/// Produces the transcript text of one video
pub trait TranscriptSource {
    fn fetch(&self, video: &VideoRef) -> SourceResult<String>;
}

/// Result of attempting one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoOutcome {
    Transcribed { video: VideoRef, transcript: String },
    Failed { video: VideoRef, reason: String },
}

impl VideoOutcome {
    pub fn video(&self) -> &VideoRef {
        match self {
            VideoOutcome::Transcribed { video, .. } | VideoOutcome::Failed { video, .. } => video,
        }
    }

    pub fn transcript(&self) -> Option<&str> {
        match self {
            VideoOutcome::Transcribed { transcript, .. } => Some(transcript),
            VideoOutcome::Failed { .. } => None,
        }
    }
}

/// Fetch every video in order, capturing failures instead of aborting.
pub fn collect_transcripts(source: &dyn TranscriptSource, videos: &[VideoRef]) -> Vec<VideoOutcome> {
    let total = videos.len();
    videos
        .iter()
        .enumerate()
        .map(|(i, video)| {
            info!("[{}/{}] {} ({})", i + 1, total, video.title, video.video_id);
            match source.fetch(video) {
                Ok(transcript) => {
                    info!(
                        "Transcribed {} ({} words)",
                        video.video_id,
                        transcript.split_whitespace().count()
                    );
                    VideoOutcome::Transcribed {
                        video: video.clone(),
                        transcript,
                    }
                }
                Err(e) => {
                    warn!("Skipping {}: {}", video.video_id, e);
                    VideoOutcome::Failed {
                        video: video.clone(),
                        reason: e.to_string(),
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailOdd;

    impl TranscriptSource for FailOdd {
        fn fetch(&self, video: &VideoRef) -> SourceResult<String> {
            if video.video_id.ends_with('1') || video.video_id.ends_with('3') {
                Err(SourceError::NotFound(format!("no audio for {}", video.video_id)))
            } else {
                Ok(format!("transcript of {}", video.video_id))
            }
        }
    }

    #[test]
    fn test_collect_keeps_going_after_failure() {
        let videos: Vec<_> = (0..4)
            .map(|i| VideoRef::new(format!("vid{i}"), format!("Video {i}")))
            .collect();
        let outcomes = collect_transcripts(&FailOdd, &videos);

        assert_eq!(outcomes.len(), 4);
        let ok: Vec<_> = outcomes.iter().filter_map(VideoOutcome::transcript).collect();
        assert_eq!(ok, vec!["transcript of vid0", "transcript of vid2"]);
        match &outcomes[1] {
            VideoOutcome::Failed { video, reason } => {
                assert_eq!(video.video_id, "vid1");
                assert_eq!(reason, "no audio for vid1");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(outcomes[3].video().video_id, "vid3");
    }

    #[test]
    fn test_watch_url() {
        let video = VideoRef::new("abc123", "Video abc123");
        assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=abc123");
    }
}
