//! Extraction backend abstraction

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::core::{ExtractionPlan, SourceRecord};
use crate::Result;

/// What an extractor reports after a download run
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Metadata of the downloaded source
    pub record: SourceRecord,
    /// Filename the extractor predicted before postprocessing renamed it
    pub predicted_path: Option<PathBuf>,
}

/// Core trait for extraction/transcode backends.
///
/// Keeps the pipeline independent of the tool that actually talks to the
/// platform and runs the codecs.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Identifier used in logs (e.g. "yt-dlp")
    fn id(&self) -> &'static str;

    /// Extract metadata for a single URL without downloading
    async fn extract_info(&self, url: &str) -> Result<Option<SourceRecord>>;

    /// Run a ranked platform search, returning at most `max_results` entries.
    ///
    /// Entries the platform could not resolve are reported as `None`.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Option<SourceRecord>>>;

    /// Fetch and transcode `url` into `workspace` following `plan`
    async fn download(
        &self,
        url: &str,
        plan: &ExtractionPlan,
        workspace: &Path,
    ) -> Result<ExtractionOutcome>;
}
