//! URL utilities for telling platform links apart from free-text queries

use url::Url;

/// Host fragments that identify a supported video platform link
pub const PLATFORM_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// Check if text is a direct video platform URL.
///
/// Anything that fails to parse, or whose host does not contain one of
/// [`PLATFORM_HOSTS`], is treated as a search query.
pub fn is_platform_url(text: &str) -> bool {
    match Url::parse(text) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| PLATFORM_HOSTS.iter().any(|known| host.contains(known)))
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// A caller's search input, classified once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceQuery {
    /// A direct link to a single video
    Url(String),
    /// Free text to run through the platform search
    Text(String),
}

impl SourceQuery {
    /// Classify raw input text
    pub fn classify(text: &str) -> Self {
        if is_platform_url(text) {
            SourceQuery::Url(text.to_string())
        } else {
            SourceQuery::Text(text.to_string())
        }
    }

}
