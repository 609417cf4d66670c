// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DuckDuckGo instant answer API.
//!
//! Only `RelatedTopics` is used. Each topic's `Text` reads
//! `"<title> - <description>"`; category groups (objects carrying a nested
//! `Topics` list instead of `Text`/`FirstURL`) are skipped.

use parley_core::{ParleyError, SearchResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::fetch::get_json;

pub const SOURCE: &str = "DuckDuckGo";

#[derive(Debug, Default, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Topic {
    #[serde(rename = "Text", default)]
    text: Option<String>,
    #[serde(rename = "FirstURL", default)]
    first_url: Option<String>,
}

pub fn request_url(base_url: &str, query: &str) -> String {
    format!(
        "{}/?q={}&format=json&no_html=1&skip_disambig=1",
        base_url.trim_end_matches('/'),
        urlencoding::encode(query)
    )
}

pub async fn search(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
) -> Result<Vec<SearchResult>, ParleyError> {
    let answer: InstantAnswer = get_json(client, &request_url(base_url, query), SOURCE).await?;
    let results = into_results(answer);
    debug!(count = results.len(), "duckduckgo results parsed");
    Ok(results)
}

fn into_results(answer: InstantAnswer) -> Vec<SearchResult> {
    answer
        .related_topics
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|value| serde_json::from_value::<Topic>(value).ok())
        .filter_map(topic_to_result)
        .collect()
}

fn topic_to_result(topic: Topic) -> Option<SearchResult> {
    let text = topic.text.unwrap_or_default();
    let link = topic.first_url.unwrap_or_default();

    let (title, snippet) = match text.split_once(" - ") {
        Some((title, rest)) if !title.is_empty() => (title.to_string(), rest.to_string()),
        Some((_, rest)) => (text.clone(), rest.to_string()),
        None => (text.clone(), text.clone()),
    };
    let snippet = if snippet.is_empty() { text } else { snippet };

    if title.is_empty() || link.is_empty() {
        return None;
    }
    Some(SearchResult {
        title,
        link,
        snippet,
        source: SOURCE.to_string(),
    })
}
