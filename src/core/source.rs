//! Source records and their UI-facing projection

use serde::{Deserialize, Serialize};

/// Maximum number of description characters kept in a search result
pub const DESCRIPTION_LIMIT: usize = 200;

/// Metadata for one candidate video, as reported by the extractor.
///
/// Fields mirror the extractor's JSON; anything the platform did not report
/// stays `None` and is defaulted by [`format_results`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Platform video ID
    #[serde(default)]
    pub id: Option<String>,
    /// Video title
    #[serde(default)]
    pub title: Option<String>,
    /// Canonical page URL
    #[serde(default)]
    pub webpage_url: Option<String>,
    /// Direct or fallback URL
    #[serde(default)]
    pub url: Option<String>,
    /// Channel or uploader name
    #[serde(default)]
    pub uploader: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Upload date as reported by the platform (usually YYYYMMDD)
    #[serde(default)]
    pub upload_date: Option<String>,
    /// Approximate file size in bytes
    #[serde(default)]
    pub filesize_approx: Option<u64>,
    /// Output filename the extractor predicted before postprocessing
    #[serde(default, rename = "_filename")]
    pub predicted_filename: Option<String>,
}

impl SourceRecord {
    /// Create a record with just a title and URL
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            webpage_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Video title, empty when unknown
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Canonical URL, falling back to the plain `url` field
    pub fn canonical_url(&self) -> &str {
        self.webpage_url
            .as_deref()
            .or(self.url.as_deref())
            .unwrap_or("")
    }

    /// Duration in whole seconds
    pub fn duration_secs(&self) -> u64 {
        self.duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d.floor() as u64)
            .unwrap_or(0)
    }
}

/// Presentation shape returned by the search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub uploader: String,
    /// Duration rendered as `M:SS`
    pub duration: String,
    pub view_count: u64,
    pub description: String,
    pub upload_date: String,
    pub filesize_approx: u64,
}

impl From<&SourceRecord> for SearchResult {
    fn from(record: &SourceRecord) -> Self {
        Self {
            title: record.title().to_string(),
            url: record.canonical_url().to_string(),
            uploader: record
                .uploader
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            duration: format_duration(record.duration_secs()),
            view_count: record.view_count.unwrap_or(0),
            description: truncate_description(record.description.as_deref()),
            upload_date: record.upload_date.clone().unwrap_or_default(),
            filesize_approx: record.filesize_approx.unwrap_or(0),
        }
    }
}

/// Project resolver output into search results, skipping missing entries
pub fn format_results<'a, I>(records: I) -> Vec<SearchResult>
where
    I: IntoIterator<Item = &'a Option<SourceRecord>>,
{
    records
        .into_iter()
        .flatten()
        .map(SearchResult::from)
        .collect()
}

/// Format seconds as `M:SS` (minutes are not padded)
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Cut a description to [`DESCRIPTION_LIMIT`] characters and mark it with `...`
pub fn truncate_description(description: Option<&str>) -> String {
    match description {
        Some(text) if !text.is_empty() => {
            let cut: String = text.chars().take(DESCRIPTION_LIMIT).collect();
            format!("{}...", cut)
        }
        _ => String::new(),
    }
}
