//! # tubefetch - search and download service
//!
//! Searches a video platform by free text or direct URL and hands back the
//! chosen result transcoded to mp3 or mp4.
//!
//! ## Features
//!
//! - Fail-soft search that degrades to an empty result list
//! - Format-specific extraction plans (audio extraction or video muxing)
//! - Per-request workspaces removed once the file has been sent
//! - Pluggable extraction backend (yt-dlp by default)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tubefetch::{DownloadPipeline, OutputFormat, PipelineOptions};
//! use tubefetch::platform::YtDlpExtractor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = Arc::new(YtDlpExtractor::new());
//!     let pipeline = DownloadPipeline::new(extractor, PipelineOptions::default());
//!
//!     let artifact = pipeline
//!         .download("https://www.youtube.com/watch?v=VIDEO_ID", OutputFormat::AudioOnly)
//!         .await?;
//!     println!("Ready: {} ({})", artifact.filename, artifact.mime_type);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod platform;
pub mod utils;
pub mod web;

// Re-export main types
pub use self::core::{
    format_results, DownloadArtifact, DownloadPipeline, OutputFormat, PipelineOptions,
    SearchResult, SourceRecord, SourceResolver, Workspace, WorkspaceManager,
};
pub use error::FetchError;

/// Result type alias for tubefetch operations
pub type Result<T> = std::result::Result<T, FetchError>;
