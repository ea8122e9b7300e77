//! Video catalogs: explicit URL lists and the YouTube Data API

use super::{SourceError, SourceResult, VideoCatalog, VideoRef};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Video id from a watch URL: the text after the last `v=`, up to any
/// further query parameter. Bare ids pass through unchanged.
pub fn parse_video_id(url: &str) -> String {
    let tail = url.rsplit("v=").next().unwrap_or(url);
    tail.split(['&', '#']).next().unwrap_or(tail).trim().to_string()
}

/// Fixed list of videos, independent of the channel
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    videos: Vec<VideoRef>,
}

impl StaticCatalog {
    /// Build from watch URLs (or bare ids). Titles are placeholders.
    pub fn from_urls<S: AsRef<str>>(urls: &[S]) -> Self {
        let videos = urls
            .iter()
            .map(|url| {
                let video_id = parse_video_id(url.as_ref());
                let short: String = video_id.chars().take(6).collect();
                VideoRef::new(video_id, format!("Video {short}"))
            })
            .filter(|v| !v.video_id.is_empty())
            .collect();
        Self { videos }
    }

    pub fn from_videos(videos: Vec<VideoRef>) -> Self {
        Self { videos }
    }
}

impl VideoCatalog for StaticCatalog {
    fn list_videos(&self, _channel_id: &str, max_results: usize) -> SourceResult<Vec<VideoRef>> {
        Ok(self.videos.iter().take(max_results).cloned().collect())
    }
}

/// HTTP agent for YouTube endpoints; statuses are mapped by the caller.
pub(super) fn api_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(30)))
        .build()
        .new_agent()
}

/// Most recent uploads of a channel via the YouTube Data API v3
pub struct YoutubeCatalog {
    api_key: String,
    agent: ureq::Agent,
}

impl YoutubeCatalog {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            agent: api_agent(),
        }
    }

    pub fn from_key(api_key: Option<&str>) -> SourceResult<Self> {
        api_key
            .filter(|k| !k.is_empty())
            .map(Self::new)
            .ok_or(SourceError::MissingApiKey)
    }
}

impl VideoCatalog for YoutubeCatalog {
    fn list_videos(&self, channel_id: &str, max_results: usize) -> SourceResult<Vec<VideoRef>> {
        // The API caps maxResults at 50
        let max = max_results.clamp(1, 50).to_string();
        debug!("Listing up to {} videos for channel {}", max, channel_id);

        let response = self
            .agent
            .get(SEARCH_URL)
            .query("part", "snippet")
            .query("channelId", channel_id)
            .query("maxResults", &max)
            .query("order", "date")
            .query("type", "video")
            .query("key", &self.api_key)
            .call()
            .map_err(|e| SourceError::Api {
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(SourceError::Api { status, message });
        }

        let body: SearchResponse = response
            .into_body()
            .read_json()
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(body.into_videos(max_results))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
}

impl SearchResponse {
    fn into_videos(self, max_results: usize) -> Vec<VideoRef> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(VideoRef::new(video_id, item.snippet.title))
            })
            .take(max_results)
            .collect()
    }
}
