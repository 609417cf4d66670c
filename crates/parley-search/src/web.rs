// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use async_trait::async_trait;
use parley_config::model::SearchConfig;
use parley_core::{
    AdapterType, HealthStatus, ParleyError, PluginAdapter, SearchOutcome, SearchProvider,
    SearchResult,
};
use tracing::{info, warn};

use crate::summary::{build_summary, merge_results};
use crate::{duckduckgo, wikipedia};

/// Searches Wikipedia and DuckDuckGo concurrently.
#[derive(Debug, Clone)]
pub struct WebSearch {
    client: reqwest::Client,
    duckduckgo_url: String,
    wikipedia_url: String,
    max_results: usize,
}

impl WebSearch {
    pub fn new(
        client: reqwest::Client,
        duckduckgo_url: impl Into<String>,
        wikipedia_url: impl Into<String>,
        max_results: usize,
    ) -> Self {
        Self {
            client,
            duckduckgo_url: duckduckgo_url.into(),
            wikipedia_url: wikipedia_url.into(),
            max_results,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, ParleyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ParleyError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(
            client,
            &config.duckduckgo_url,
            &config.wikipedia_url,
            config.max_results,
        ))
    }

    /// Queries both sources and merges the results. Never fails: a source
    /// that errors is logged and skipped.
    pub async fn collect(&self, query: &str) -> Vec<SearchResult> {
        let (wiki, ddg) = tokio::join!(
            wikipedia::search(&self.client, &self.wikipedia_url, query),
            duckduckgo::search(&self.client, &self.duckduckgo_url, query),
        );

        let wiki = wiki.unwrap_or_else(|e| {
            warn!(source = wikipedia::SOURCE, error = %e, "search source failed");
            Vec::new()
        });
        let ddg = ddg.unwrap_or_else(|e| {
            warn!(source = duckduckgo::SOURCE, error = %e, "search source failed");
            Vec::new()
        });
        info!(
            query = %query,
            wikipedia = wiki.len(),
            duckduckgo = ddg.len(),
            "web search complete"
        );

        merge_results(query, wiki, ddg, self.max_results)
    }
}

#[async_trait]
impl PluginAdapter for WebSearch {
    fn name(&self) -> &str {
        "web"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Search
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SearchProvider for WebSearch {
    async fn search(&self, query: &str) -> Result<SearchOutcome, ParleyError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ParleyError::InvalidRequest("search query must not be empty".into()));
        }
        let results = self.collect(query).await;
        let summary = build_summary(query, &results, chrono::Utc::now().date_naive());
        Ok(SearchOutcome { results, summary })
    }
}
