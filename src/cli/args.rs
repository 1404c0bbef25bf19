//! Command line argument parsing

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::resolver::DEFAULT_MAX_RESULTS;
use crate::core::PipelineOptions;
use crate::platform::DEFAULT_YTDLP;

/// tubefetch - search a video platform and serve results as mp3 or mp4
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "5000")]
    pub port: u16,

    /// yt-dlp executable
    #[arg(long, value_name = "PATH", default_value = DEFAULT_YTDLP)]
    pub ytdlp: PathBuf,

    /// Directory under which per-request workspaces are created
    #[arg(long, value_name = "DIR")]
    pub workspace_root: Option<PathBuf>,

    /// Number of results returned by a text search
    #[arg(long, default_value = "5")]
    pub max_results: usize,

    /// Abort an extraction after this long (e.g., 90s, 5m)
    #[arg(long, value_name = "DURATION")]
    pub extract_timeout: Option<humantime::Duration>,

    /// Downloads allowed to run at once (0 means unlimited)
    #[arg(long, default_value = "0")]
    pub max_concurrent_downloads: usize,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Socket address for the listener
    pub fn bind_addr(&self) -> String {
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }

    /// Get the extraction timeout as Duration
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.extract_timeout.as_deref().copied()
    }

    /// Pipeline settings derived from the flags
    pub fn pipeline_options(&self) -> PipelineOptions {
        let options =
            PipelineOptions::default().with_max_concurrent_downloads(self.max_concurrent_downloads);
        match &self.workspace_root {
            Some(root) => options.with_workspace_root(root),
            None => options,
        }
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

impl VerbosityLevel {
    /// Default log filter when `RUST_LOG` is unset
    pub fn log_filter(self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "info",
            VerbosityLevel::Verbose => "debug",
        }
    }
}

impl Default for Args {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            ytdlp: PathBuf::from(DEFAULT_YTDLP),
            workspace_root: None,
            max_results: DEFAULT_MAX_RESULTS,
            extract_timeout: None,
            max_concurrent_downloads: 0,
            verbose: false,
            quiet: false,
        }
    }
}
