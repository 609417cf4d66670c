// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wikipedia full-text search via the MediaWiki action API.

use std::collections::HashMap;

use parley_core::{ParleyError, SearchResult};
use serde::Deserialize;
use tracing::debug;

use crate::fetch::get_json;

pub const SOURCE: &str = "Wikipedia";

/// Pages requested per query.
const PAGE_LIMIT: u32 = 3;

/// Intro extracts longer than this are cut and suffixed with `...`.
pub const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<Query>,
}

#[derive(Debug, Default, Deserialize)]
struct Query {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    title: String,
    /// Search rank; the `pages` object itself is keyed by page id.
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    canonicalurl: Option<String>,
}

/// Builds the generator=search request URL for `query`.
pub fn request_url(base_url: &str, query: &str) -> String {
    format!(
        "{base_url}?action=query&format=json&prop=extracts%7Cinfo&exintro=1&explaintext=1\
         &inprop=url&generator=search&gsrlimit={PAGE_LIMIT}&gsrsearch={}",
        urlencoding::encode(query)
    )
}

/// Searches Wikipedia and returns up to three pages in rank order.
pub async fn search(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
) -> Result<Vec<SearchResult>, ParleyError> {
    let response: QueryResponse = get_json(client, &request_url(base_url, query), SOURCE).await?;
    let results = into_results(response);
    debug!(count = results.len(), "wikipedia results parsed");
    Ok(results)
}

fn into_results(response: QueryResponse) -> Vec<SearchResult> {
    let Some(query) = response.query else {
        return Vec::new();
    };
    let mut pages: Vec<Page> = query.pages.into_values().collect();
    pages.sort_by_key(|p| p.index.unwrap_or(u32::MAX));

    pages
        .into_iter()
        .map(|page| {
            let link = page.canonicalurl.filter(|u| !u.is_empty()).unwrap_or_else(|| {
                format!(
                    "https://en.wikipedia.org/wiki/{}",
                    urlencoding::encode(&page.title)
                )
            });
            SearchResult {
                snippet: page.extract.as_deref().map(truncate_extract).unwrap_or_default(),
                title: page.title,
                link,
                source: SOURCE.to_string(),
            }
        })
        .collect()
}

fn truncate_extract(extract: &str) -> String {
    let mut chars = extract.chars();
    let mut snippet: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        snippet.push_str("...");
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<SearchResult> {
        into_results(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn pages_are_ordered_by_search_rank() {
        let results = parse(
            r#"{"query":{"pages":{
                "900":{"title":"Second","index":2,"extract":"b","canonicalurl":"https://en.wikipedia.org/wiki/Second"},
                "12":{"title":"First","index":1,"extract":"a","canonicalurl":"https://en.wikipedia.org/wiki/First"}
            }}}"#,
        );
        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second"]);
        assert!(results.iter().all(|r| r.source == SOURCE));
    }

    #[test]
    fn missing_canonical_url_falls_back_to_title_link() {
        let results = parse(r#"{"query":{"pages":{"1":{"title":"Rust (language)","index":1}}}}"#);
        assert_eq!(
            results[0].link,
            "https://en.wikipedia.org/wiki/Rust%20%28language%29"
        );
        assert_eq!(results[0].snippet, "");
    }

    #[test]
    fn long_extracts_are_truncated() {
        let long = "é".repeat(SNIPPET_CHARS + 5);
        let snippet = truncate_extract(&long);
        assert_eq!(snippet.chars().count(), SNIPPET_CHARS + 3);
        assert!(snippet.ends_with("..."));

        let exact = "x".repeat(SNIPPET_CHARS);
        assert_eq!(truncate_extract(&exact), exact);
    }

    #[test]
    fn empty_response_yields_nothing() {
        assert!(parse("{}").is_empty());
        assert!(parse(r#"{"batchcomplete":""}"#).is_empty());
    }

    #[test]
    fn request_url_encodes_query() {
        let url = request_url("https://en.wikipedia.org/w/api.php", "tokio & rust");
        assert!(url.starts_with("https://en.wikipedia.org/w/api.php?action=query"));
        assert!(url.ends_with("gsrsearch=tokio%20%26%20rust"));
        assert!(url.contains("gsrlimit=3"));
    }
}
