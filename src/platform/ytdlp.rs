//! yt-dlp command-line backend
//!
//! Every operation shells out to yt-dlp and reads its single-JSON output.
//! Transcoding is done by yt-dlp's ffmpeg postprocessors.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::core::{ExtractionPlan, PostProcessor, SourceRecord};
use crate::error::FetchError;
use crate::platform::extractor::{ExtractionOutcome, Extractor};
use crate::Result;

/// Default program name, resolved through `PATH`
pub const DEFAULT_YTDLP: &str = "yt-dlp";

/// Search results payload of `yt-dlp -J ytsearchN:...`
#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    entries: Vec<Option<SourceRecord>>,
}

/// Extractor that drives the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    program: PathBuf,
    leading_args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl YtDlpExtractor {
    /// Use `yt-dlp` from `PATH`
    pub fn new() -> Self {
        Self::with_program(DEFAULT_YTDLP)
    }

    /// Use a specific yt-dlp executable
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout: None,
        }
    }

    /// Launch yt-dlp through another program, e.g. `python3 -m yt_dlp`
    pub fn with_launcher<I, S>(program: impl Into<PathBuf>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
            timeout: None,
        }
    }

    /// Kill yt-dlp runs that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program used to launch yt-dlp
    pub fn program(&self) -> &Path {
        &self.program
    }

    async fn run(&self, args: Vec<OsString>) -> Result<Output> {
        debug!("Running {} {:?}", self.program.display(), args);

        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| FetchError::Timeout(limit))?,
            None => command.output().await,
        };

        let output = output.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                FetchError::ExtractorNotFound(self.program.display().to_string())
            } else {
                FetchError::ResourceError(err)
            }
        })?;

        if !output.status.success() {
            let message = error_message(&String::from_utf8_lossy(&output.stderr))
                .unwrap_or_else(|| format!("yt-dlp exited with {}", output.status));
            error!("yt-dlp failed: {}", message);
            return Err(FetchError::ExtractionFailure(message));
        }

        Ok(output)
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn id(&self) -> &'static str {
        "yt-dlp"
    }

    async fn extract_info(&self, url: &str) -> Result<Option<SourceRecord>> {
        let output = self.run(info_args(url)).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(stdout.trim())?))
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Option<SourceRecord>>> {
        let output = self.run(search_args(query, max_results)).await?;
        let payload: SearchPayload = serde_json::from_slice(&output.stdout)?;
        let mut entries = payload.entries;
        entries.truncate(max_results);
        Ok(entries)
    }

    async fn download(
        &self,
        url: &str,
        plan: &ExtractionPlan,
        workspace: &Path,
    ) -> Result<ExtractionOutcome> {
        debug!("Downloading {} into {}", url, workspace.display());
        let output = self.run(download_args(url, plan)).await?;
        let record: SourceRecord = serde_json::from_slice(&output.stdout)?;
        info!("yt-dlp finished downloading {:?}", record.title());

        let predicted_path = record.predicted_filename.as_ref().map(PathBuf::from);
        Ok(ExtractionOutcome {
            record,
            predicted_path,
        })
    }
}

fn base_args() -> Vec<OsString> {
    vec![
        "--dump-single-json".into(),
        "--no-warnings".into(),
        "--no-progress".into(),
    ]
}

/// Arguments for metadata-only extraction of one URL
pub fn info_args(url: &str) -> Vec<OsString> {
    let mut args = base_args();
    args.extend(["--skip-download".into(), "--no-playlist".into()]);
    args.extend(["--".into(), url.into()]);
    args
}

/// Arguments for a ranked search
pub fn search_args(query: &str, max_results: usize) -> Vec<OsString> {
    let mut args = base_args();
    args.push("--skip-download".into());
    args.extend(["--".into(), format!("ytsearch{}:{}", max_results, query).into()]);
    args
}

/// Arguments for a download run that follows `plan`
pub fn download_args(url: &str, plan: &ExtractionPlan) -> Vec<OsString> {
    let mut args = base_args();
    args.extend([
        "--no-simulate".into(),
        "--no-playlist".into(),
        "--format".into(),
        plan.format_selector.clone().into(),
        "--output".into(),
        plan.output_template.clone().into_os_string(),
    ]);

    if let Some(container) = plan.merge_output_format {
        args.extend(["--merge-output-format".into(), container.into()]);
    }

    for postprocessor in &plan.postprocessors {
        match postprocessor {
            PostProcessor::ExtractAudio {
                codec,
                quality_kbps,
            } => args.extend([
                "--extract-audio".into(),
                "--audio-format".into(),
                (*codec).into(),
                "--audio-quality".into(),
                format!("{}K", quality_kbps).into(),
            ]),
            PostProcessor::EmbedMetadata => args.push("--embed-metadata".into()),
            PostProcessor::ConvertVideo { container } => {
                args.extend(["--recode-video".into(), (*container).into()])
            }
        }
    }

    args.extend(["--".into(), url.into()]);
    args
}

/// Pull the most useful message out of yt-dlp's stderr
fn error_message(stderr: &str) -> Option<String> {
    static ERROR_LINE: OnceLock<Regex> = OnceLock::new();
    let pattern =
        ERROR_LINE.get_or_init(|| Regex::new(r"(?m)^ERROR:\s*(.+?)\s*$").expect("valid pattern"));

    if let Some(captures) = pattern.captures_iter(stderr).last() {
        return Some(captures[1].to_string());
    }

    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}
