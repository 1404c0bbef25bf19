//! Query resolution against the extraction backend

use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::core::SourceRecord;
use crate::platform::Extractor;
use crate::utils::SourceQuery;

/// Number of search results requested when the caller does not say otherwise
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Turns a search query or direct URL into candidate source records.
///
/// Resolution is fail-soft: extractor errors are logged and reported as an
/// empty result list.
#[derive(Clone)]
pub struct SourceResolver {
    extractor: Arc<dyn Extractor>,
    max_results: usize,
}

impl SourceResolver {
    /// Create a resolver backed by `extractor`
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self {
            extractor,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Set the default number of search results
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Default number of search results
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Classify `text` and resolve it with the default result limit
    pub async fn search(&self, text: &str) -> Vec<Option<SourceRecord>> {
        self.resolve(&SourceQuery::classify(text), self.max_results)
            .await
    }

    /// Resolve a classified query.
    ///
    /// Direct URLs yield at most one record; text queries yield at most
    /// `max_results` records in the backend's order.
    #[instrument(skip(self), fields(extractor = self.extractor.id()))]
    pub async fn resolve(&self, query: &SourceQuery, max_results: usize) -> Vec<Option<SourceRecord>> {
        let resolved = match query {
            SourceQuery::Url(url) => self
                .extractor
                .extract_info(url)
                .await
                .map(|record| record.into_iter().map(Some).collect::<Vec<_>>()),
            SourceQuery::Text(text) => {
                self.extractor
                    .search(text, max_results)
                    .await
                    .map(|mut records| {
                        records.truncate(max_results);
                        records
                    })
            }
        };

        match resolved {
            Ok(records) => {
                debug!("Resolved {} entries", records.len());
                records
            }
            Err(err) => {
                error!("Error searching platform: {}", err);
                Vec::new()
            }
        }
    }
}
