//! Transcript sources: pre-made text files, published captions and local
//! speech-to-text

use super::catalog::api_agent;
use super::{SourceError, SourceResult, TranscriptSource, VideoRef};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Collapse runs of whitespace (segment joins, newlines) into single spaces.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reads `<dir>/<video_id>.txt`
#[derive(Debug, Clone)]
pub struct DirectoryTranscripts {
    dir: PathBuf,
}

impl DirectoryTranscripts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, video: &VideoRef) -> PathBuf {
        self.dir.join(format!("{}.txt", video.video_id))
    }
}

impl TranscriptSource for DirectoryTranscripts {
    fn fetch(&self, video: &VideoRef) -> SourceResult<String> {
        let path = self.path_for(video);
        if !path.exists() {
            return Err(SourceError::NotFound(format!(
                "No transcript file at {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(normalize_whitespace(&content))
    }
}

const TIMEDTEXT_URL: &str = "https://www.youtube.com/api/timedtext";

/// Published YouTube captions in one language
pub struct CaptionTranscripts {
    language: String,
    agent: ureq::Agent,
}

impl CaptionTranscripts {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            agent: api_agent(),
        }
    }
}

impl TranscriptSource for CaptionTranscripts {
    fn fetch(&self, video: &VideoRef) -> SourceResult<String> {
        debug!("Fetching {} captions for {}", self.language, video.video_id);
        let response = self
            .agent
            .get(TIMEDTEXT_URL)
            .query("v", &video.video_id)
            .query("lang", &self.language)
            .query("fmt", "json3")
            .call()
            .map_err(|e| SourceError::Api {
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        caption_text(&video.video_id, status, &body)
    }
}

/// Turn a timedtext reply into transcript text. Disabled or missing
/// captions are `NotFound`, never text.
fn caption_text(video_id: &str, status: u16, body: &str) -> SourceResult<String> {
    match status {
        403 => {
            return Err(SourceError::NotFound(format!(
                "Transcripts are disabled for {video_id}"
            )))
        }
        404 => {
            return Err(SourceError::NotFound(format!(
                "No transcript found for {video_id}"
            )))
        }
        s if s >= 400 => {
            return Err(SourceError::Api {
                status: s,
                message: body.to_string(),
            })
        }
        _ => {}
    }

    // No track in the requested language comes back as 200 with an empty body
    if body.trim().is_empty() {
        return Err(SourceError::NotFound(format!(
            "Transcripts are disabled or unavailable for {video_id}"
        )));
    }

    let track: CaptionTrack =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;
    let text = track.text();
    if text.is_empty() {
        return Err(SourceError::NotFound(format!(
            "No transcript found for {video_id}"
        )));
    }
    Ok(text)
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(default)]
    events: Vec<CaptionEvent>,
}

#[derive(Debug, Deserialize)]
struct CaptionEvent {
    #[serde(default)]
    segs: Vec<CaptionSegment>,
}

#[derive(Debug, Deserialize)]
struct CaptionSegment {
    #[serde(default)]
    utf8: String,
}

impl CaptionTrack {
    /// One caption line per event, lines joined with spaces
    fn text(&self) -> String {
        let lines: Vec<String> = self
            .events
            .iter()
            .map(|event| event.segs.iter().map(|seg| seg.utf8.as_str()).collect())
            .collect();
        normalize_whitespace(&lines.join(" "))
    }
}

/// Downloads audio with yt-dlp and transcribes it with a Whisper-compatible CLI
#[derive(Debug, Clone)]
pub struct SpeechToText {
    yt_dlp: String,
    whisper: String,
    model: String,
}

impl SpeechToText {
    pub fn new(
        yt_dlp: impl Into<String>,
        whisper: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            yt_dlp: yt_dlp.into(),
            whisper: whisper.into(),
            model: model.into(),
        }
    }

    fn download_audio(&self, video: &VideoRef, dir: &Path) -> SourceResult<PathBuf> {
        let template = dir.join("%(id)s.%(ext)s");
        let mut cmd = Command::new(&self.yt_dlp);
        cmd.args(["-f", "bestaudio", "--extract-audio", "--audio-format", "mp3", "-o"])
            .arg(&template)
            .arg(video.watch_url());
        run(&mut cmd, &self.yt_dlp)?;

        find_with_extension(dir, "mp3")?
            .ok_or_else(|| SourceError::NotFound("Audio file not found after download".into()))
    }

    fn transcribe(&self, audio: &Path, dir: &Path) -> SourceResult<String> {
        let mut cmd = Command::new(&self.whisper);
        cmd.arg(audio)
            .args(["--model", &self.model, "--output_format", "txt", "--output_dir"])
            .arg(dir);
        run(&mut cmd, &self.whisper)?;

        let text_path = find_with_extension(dir, "txt")?.ok_or_else(|| {
            SourceError::NotFound("Transcript not found after transcription".into())
        })?;
        Ok(normalize_whitespace(&std::fs::read_to_string(text_path)?))
    }
}

impl TranscriptSource for SpeechToText {
    fn fetch(&self, video: &VideoRef) -> SourceResult<String> {
        // Scratch space is removed when `dir` drops
        let dir = tempfile::tempdir()?;
        let audio = self.download_audio(video, dir.path())?;
        debug!("Downloaded audio to {}", audio.display());
        self.transcribe(&audio, dir.path())
    }
}

/// Run a command, mapping spawn failures and non-zero exits to `SourceError`.
fn run(cmd: &mut Command, name: &str) -> SourceResult<()> {
    debug!("Running {:?}", cmd);
    let output = cmd.output().map_err(|e| SourceError::Command {
        command: name.to_string(),
        message: format!("failed to start: {e}"),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
        return Err(SourceError::Command {
            command: name.to_string(),
            message: format!("{} {}", output.status, last_line.trim()),
        });
    }
    Ok(())
}

/// First file in `dir` with the given extension (sorted by name).
fn find_with_extension(dir: &Path, extension: &str) -> SourceResult<Option<PathBuf>> {
    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == extension))
        .collect();
    matches.sort();
    Ok(matches.into_iter().next())
}
