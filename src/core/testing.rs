//! In-memory extractor used by the unit tests

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::{ExtractionPlan, PostProcessor, SourceRecord};
use crate::error::FetchError;
use crate::platform::{ExtractionOutcome, Extractor};
use crate::Result;

/// What the fake writes into the workspace on download
#[derive(Debug, Clone)]
enum Produce {
    /// `<title>.<ext>` where ext follows the plan
    TitleWithPlanExtension,
    /// A file with exactly this name
    Named(String),
    Nothing,
}

pub(crate) struct FakeExtractor {
    title: String,
    search_results: usize,
    empty_info: bool,
    fail: bool,
    produce: Produce,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    searches: Mutex<Vec<(String, usize)>>,
    downloads: Mutex<Vec<(String, ExtractionPlan)>>,
}

impl FakeExtractor {
    pub(crate) fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            search_results: 5,
            empty_info: false,
            fail: false,
            produce: Produce::TitleWithPlanExtension,
            delay: None,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            searches: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_search_results(mut self, count: usize) -> Self {
        self.search_results = count;
        self
    }

    pub(crate) fn with_empty_info(mut self) -> Self {
        self.empty_info = true;
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub(crate) fn producing(mut self, file_name: &str) -> Self {
        self.produce = Produce::Named(file_name.to_string());
        self
    }

    pub(crate) fn producing_nothing(mut self) -> Self {
        self.produce = Produce::Nothing;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn searches(&self) -> Vec<(String, usize)> {
        self.searches.lock().unwrap().clone()
    }

    pub(crate) fn downloads(&self) -> Vec<(String, ExtractionPlan)> {
        self.downloads.lock().unwrap().clone()
    }

    /// Highest number of downloads that ran at the same time
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn record(&self) -> SourceRecord {
        SourceRecord {
            id: Some("abc123".to_string()),
            uploader: Some("Fake Channel".to_string()),
            duration: Some(125.0),
            ..SourceRecord::new(self.title.clone(), "https://www.youtube.com/watch?v=abc123")
        }
    }

    fn failure(&self) -> FetchError {
        FetchError::ExtractionFailure("[youtube] abc123: Video unavailable".to_string())
    }
}

fn plan_extension(plan: &ExtractionPlan) -> &'static str {
    plan.postprocessors
        .iter()
        .find_map(|pp| match pp {
            PostProcessor::ExtractAudio { codec, .. } => Some(*codec),
            PostProcessor::ConvertVideo { container } => Some(*container),
            PostProcessor::EmbedMetadata => None,
        })
        .unwrap_or("webm")
}

#[async_trait]
impl Extractor for FakeExtractor {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn extract_info(&self, _url: &str) -> Result<Option<SourceRecord>> {
        if self.fail {
            return Err(self.failure());
        }
        if self.empty_info {
            return Ok(None);
        }
        Ok(Some(self.record()))
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Option<SourceRecord>>> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        if self.fail {
            return Err(self.failure());
        }

        Ok((0..self.search_results)
            .map(|i| {
                Some(SourceRecord {
                    duration: Some((i * 61) as f64),
                    description: Some("d".repeat(150 + i * 40)),
                    view_count: Some(i as u64 * 1000),
                    ..SourceRecord::new(format!("Result {}", i), format!("https://youtu.be/{}", i))
                })
            })
            .collect())
    }

    async fn download(
        &self,
        url: &str,
        plan: &ExtractionPlan,
        workspace: &Path,
    ) -> Result<ExtractionOutcome> {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), plan.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            return Err(self.failure());
        }

        let name = match &self.produce {
            Produce::TitleWithPlanExtension => {
                Some(format!("{}.{}", self.title, plan_extension(plan)))
            }
            Produce::Named(name) => Some(name.clone()),
            Produce::Nothing => None,
        };
        if let Some(name) = name {
            std::fs::write(workspace.join(name), b"media bytes")?;
        }

        Ok(ExtractionOutcome {
            record: self.record(),
            predicted_path: Some(PathBuf::from(workspace).join(format!("{}.webm", self.title))),
        })
    }
}
