//! Download orchestration
//!
//! A download moves through `Validated → WorkspaceReady → Extracted →
//! ArtifactResolved → Verified → Ready`. Any failure ends the request; nothing
//! is retried.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use crate::core::{OutputFormat, Workspace, WorkspaceManager};
use crate::error::FetchError;
use crate::platform::{ExtractionOutcome, Extractor};
use crate::utils::{safe_display_name, title_fallback_path};
use crate::Result;

/// Pipeline configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Directory workspaces are created in (system temp dir when unset)
    pub workspace_root: Option<PathBuf>,
    /// Maximum downloads running at once, 0 for no limit
    pub max_concurrent_downloads: usize,
}

impl PipelineOptions {
    /// Set the workspace root directory
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Limit the number of simultaneous downloads
    pub fn with_max_concurrent_downloads(mut self, limit: usize) -> Self {
        self.max_concurrent_downloads = limit;
        self
    }
}

/// Progress marker for one download request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validated,
    WorkspaceReady,
    Extracted,
    ArtifactResolved,
    Verified,
    Ready,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A produced file, ready to be sent to the caller.
///
/// Owns the workspace it lives in; dropping the artifact removes the file.
#[derive(Debug)]
pub struct DownloadArtifact {
    /// On-disk location inside the workspace
    pub path: PathBuf,
    /// Sanitized name to present to the caller
    pub filename: String,
    /// Format the file was produced in
    pub format: OutputFormat,
    /// MIME type matching `format`
    pub mime_type: &'static str,
    workspace: Workspace,
}

impl DownloadArtifact {
    /// Workspace that holds the file
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Split into the file path and the workspace keeping it alive
    pub fn into_parts(self) -> (PathBuf, Workspace) {
        (self.path, self.workspace)
    }
}

/// Orchestrates extraction, artifact lookup and naming for downloads
pub struct DownloadPipeline {
    extractor: Arc<dyn Extractor>,
    workspaces: WorkspaceManager,
    permits: Option<Arc<Semaphore>>,
}

impl DownloadPipeline {
    /// Create a pipeline backed by `extractor`
    pub fn new(extractor: Arc<dyn Extractor>, options: PipelineOptions) -> Self {
        let workspaces = match options.workspace_root {
            Some(root) => WorkspaceManager::new().with_root(root),
            None => WorkspaceManager::new(),
        };
        let permits = (options.max_concurrent_downloads > 0)
            .then(|| Arc::new(Semaphore::new(options.max_concurrent_downloads)));

        Self {
            extractor,
            workspaces,
            permits,
        }
    }

    /// Download `url` and transcode it to `format`
    #[instrument(skip(self), fields(extractor = self.extractor.id()))]
    pub async fn download(&self, url: &str, format: OutputFormat) -> Result<DownloadArtifact> {
        let mut stage = None;
        let result = self.run(url, format, &mut stage).await;
        if let Err(err) = &result {
            match stage {
                Some(stage) => error!("Download error after {}: {}", stage, err),
                None => error!("Download error: {}", err),
            }
        }
        result
    }

    async fn run(
        &self,
        url: &str,
        format: OutputFormat,
        stage: &mut Option<Stage>,
    ) -> Result<DownloadArtifact> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::InvalidInput("No URL provided".to_string()));
        }
        advance(stage, Stage::Validated);

        let _permit = match &self.permits {
            Some(permits) => Some(permits.clone().acquire_owned().await.map_err(|_| {
                FetchError::ResourceError(std::io::Error::other("download limiter closed"))
            })?),
            None => None,
        };

        let workspace = self.workspaces.allocate()?;
        advance(stage, Stage::WorkspaceReady);

        let plan = format.plan(workspace.path());
        let outcome = self
            .extractor
            .download(url, &plan, workspace.path())
            .await?;
        advance(stage, Stage::Extracted);

        let path = resolve_artifact_path(&workspace, format, &outcome)
            .ok_or(FetchError::ArtifactMissing { format })?;
        advance(stage, Stage::ArtifactResolved);

        if !is_file(&path).await {
            return Err(FetchError::ArtifactMissing { format });
        }
        advance(stage, Stage::Verified);

        let filename = safe_display_name(outcome.record.title(), format.extension());
        advance(stage, Stage::Ready);
        info!("Prepared {} from {}", filename, path.display());

        Ok(DownloadArtifact {
            path,
            filename,
            format,
            mime_type: format.mime_type(),
            workspace,
        })
    }
}

fn advance(stage: &mut Option<Stage>, next: Stage) {
    debug!("Download stage: {}", next);
    *stage = Some(next);
}

/// Find the file the extractor actually produced.
///
/// Postprocessing renames the file the extractor predicted, so the workspace
/// is scanned for the format's extension first; the title-derived name is
/// only a last guess and never leaves the workspace.
fn resolve_artifact_path(
    workspace: &Workspace,
    format: OutputFormat,
    outcome: &ExtractionOutcome,
) -> Option<PathBuf> {
    let extension = format.extension();
    let resolved = workspace
        .files_with_extension(extension)
        .into_iter()
        .next()
        .or_else(|| title_fallback_path(workspace.path(), outcome.record.title(), extension));

    match (&outcome.predicted_path, &resolved) {
        (Some(predicted), Some(resolved)) if predicted != resolved => debug!(
            "Extractor predicted {}, using {}",
            predicted.display(),
            resolved.display()
        ),
        (_, None) => warn!(
            "Title {:?} does not name a file inside the workspace",
            outcome.record.title()
        ),
        _ => {}
    }
    resolved
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
