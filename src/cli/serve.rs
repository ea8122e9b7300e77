//! Serve command handler

use super::{build_analyzer, build_assessor, build_catalog};
use crate::config::UserConfig;
use crate::server::Server;
use crate::sources::{SourceError, SourceResult, VideoCatalog, VideoRef};
use anyhow::Result;
use std::path::PathBuf;
use tracing::warn;

/// Stands in when no YouTube key is configured; `analyze` requests fail
/// while scoring and lookups keep working.
struct UnconfiguredCatalog;

impl VideoCatalog for UnconfiguredCatalog {
    fn list_videos(&self, _channel_id: &str, _max_results: usize) -> SourceResult<Vec<VideoRef>> {
        Err(SourceError::MissingApiKey)
    }
}

/// Run the stdio JSON server
pub fn run(
    config: &UserConfig,
    transcripts: Option<PathBuf>,
    captions: bool,
    no_ai: bool,
) -> Result<()> {
    let assessor = build_assessor(config, no_ai)?;
    let catalog = build_catalog(config, &[]).unwrap_or_else(|e| {
        warn!("{:#}", e);
        Box::new(UnconfiguredCatalog) as Box<dyn VideoCatalog>
    });
    let analyzer = build_analyzer(config, assessor, catalog, transcripts, captions)?;
    Server::new(analyzer).run_stdio()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_catalog_reports_missing_key() {
        assert!(matches!(
            UnconfiguredCatalog.list_videos("UC1", 3),
            Err(SourceError::MissingApiKey)
        ));
    }
}
