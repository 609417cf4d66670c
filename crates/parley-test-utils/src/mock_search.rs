// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock search provider returning canned results.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::{
    AdapterType, HealthStatus, ParleyError, PluginAdapter, SearchOutcome, SearchProvider,
    SearchResult,
};
use parley_search::{build_summary, merge_results};

/// Returns the same results for every query, merged and summarized the way
/// the real web search does it. An empty list produces the placeholder.
pub struct MockSearch {
    results: Vec<SearchResult>,
    failure: Option<String>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearch {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            failure: None,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider whose every search fails.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::with_results(Vec::new())
        }
    }

    /// Convenience result with a `https://example.com/<title>` link.
    pub fn result(title: &str, source: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            link: format!("https://example.com/{title}"),
            snippet: format!("All about {title}."),
            source: source.to_string(),
        }
    }

    pub async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockSearch {
    fn name(&self) -> &str {
        "mock-search"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Search
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> Result<SearchOutcome, ParleyError> {
        self.queries.lock().await.push(query.to_string());
        if let Some(message) = &self.failure {
            return Err(ParleyError::Search {
                message: message.clone(),
                source: None,
            });
        }
        let results = merge_results(query, self.results.clone(), Vec::new(), usize::MAX);
        let summary = build_summary(query, &results, chrono::Utc::now().date_naive());
        Ok(SearchOutcome { results, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_results_produce_placeholder() {
        let search = MockSearch::with_results(Vec::new());
        let outcome = search.search("nothing").await.unwrap();
        assert!(!outcome.has_results());
        assert_eq!(search.queries().await, ["nothing"]);
    }

    #[tokio::test]
    async fn canned_results_are_summarized() {
        let search = MockSearch::with_results(vec![MockSearch::result("Rust", "Wikipedia")]);
        let outcome = search.search("rust").await.unwrap();
        assert!(outcome.has_results());
        assert!(outcome.summary.contains("[1] Rust\nSource: Wikipedia\n"));
    }

    #[tokio::test]
    async fn failing_provider_errors() {
        let err = MockSearch::failing("offline").search("q").await.unwrap_err();
        assert!(matches!(err, ParleyError::Search { .. }));
    }
}
