//! Output formats and the extraction plans they map to

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::mime_from_ext;

/// Bitrate used when transcoding audio-only downloads
pub const AUDIO_QUALITY_KBPS: u32 = 192;

/// Output template handed to the extractor, relative to the workspace
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Requested output format for a download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Audio track transcoded to mp3
    AudioOnly,
    /// Best mp4 video muxed with m4a audio
    VideoMuxed,
}

impl OutputFormat {
    /// Parse the wire value sent by clients.
    ///
    /// A missing value means mp3; any value other than `mp3` selects the
    /// video branch.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None | Some("mp3") => OutputFormat::AudioOnly,
            Some("mp4") => OutputFormat::VideoMuxed,
            Some(other) => {
                tracing::warn!("Unknown format {:?}, falling back to mp4", other);
                OutputFormat::VideoMuxed
            }
        }
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::AudioOnly => "mp3",
            OutputFormat::VideoMuxed => "mp4",
        }
    }

    /// MIME type of the produced file
    pub fn mime_type(&self) -> &'static str {
        mime_from_ext(self.extension())
    }

    /// Build the extraction plan that produces this format inside `workspace`
    pub fn plan(&self, workspace: &Path) -> ExtractionPlan {
        let output_template = workspace.join(OUTPUT_TEMPLATE);
        match self {
            OutputFormat::AudioOnly => ExtractionPlan {
                format_selector: "bestaudio".to_string(),
                postprocessors: vec![
                    PostProcessor::ExtractAudio {
                        codec: "mp3",
                        quality_kbps: AUDIO_QUALITY_KBPS,
                    },
                    PostProcessor::EmbedMetadata,
                ],
                output_template,
                merge_output_format: None,
            },
            OutputFormat::VideoMuxed => ExtractionPlan {
                format_selector: "bestvideo[ext=mp4]+bestaudio[ext=m4a]".to_string(),
                postprocessors: vec![PostProcessor::ConvertVideo { container: "mp4" }],
                output_template,
                merge_output_format: Some("mp4"),
            },
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    /// Strict parsing for configuration values; only `mp3` and `mp4` are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp3" => Ok(OutputFormat::AudioOnly),
            "mp4" => Ok(OutputFormat::VideoMuxed),
            other => Err(format!("Unsupported output format: {}", other)),
        }
    }
}

/// One step of the postprocessing chain run after the raw stream is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    /// Transcode the audio stream to `codec` at the given bitrate
    ExtractAudio {
        codec: &'static str,
        quality_kbps: u32,
    },
    /// Write title/uploader tags into the output file
    EmbedMetadata,
    /// Make sure the final container is `container`
    ConvertVideo { container: &'static str },
}

/// Format-specific configuration for one extract-and-transcode run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPlan {
    /// Stream selection expression
    pub format_selector: String,
    /// Ordered postprocessors
    pub postprocessors: Vec<PostProcessor>,
    /// Absolute output template inside the workspace
    pub output_template: PathBuf,
    /// Container used when separate video and audio streams are merged
    pub merge_output_format: Option<&'static str>,
}
