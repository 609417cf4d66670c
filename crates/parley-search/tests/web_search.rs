// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use parley_core::{PLACEHOLDER_SOURCE, ParleyError, SearchProvider};
use parley_search::WebSearch;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_for(server: &MockServer) -> WebSearch {
    WebSearch::new(
        reqwest::Client::new(),
        format!("{}/ddg", server.uri()),
        format!("{}/w/api.php", server.uri()),
        10,
    )
}

async fn mount_wikipedia(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("generator", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_duckduckgo(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/ddg/"))
        .and(query_param("format", "json"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn merges_both_sources_wikipedia_first() {
    let server = MockServer::start().await;
    mount_wikipedia(
        &server,
        json!({"query": {"pages": {
            "7": {"title": "Rust (programming language)", "index": 1,
                  "extract": "Rust is a general-purpose language.",
                  "canonicalurl": "https://en.wikipedia.org/wiki/Rust_(programming_language)"}
        }}}),
    )
    .await;
    mount_duckduckgo(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"RelatedTopics": [
            {"Text": "Rust Foundation - Steward of the language", "FirstURL": "https://duckduckgo.com/Rust_Foundation"},
            {"Text": "Duplicate - same link", "FirstURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)"}
        ]})),
    )
    .await;

    let outcome = search_for(&server).search("rust language").await.unwrap();

    let sources: Vec<_> = outcome.results.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(sources, ["Wikipedia", "DuckDuckGo"]);
    assert_eq!(outcome.results[1].title, "Rust Foundation");
    assert!(outcome.has_results());
    assert!(outcome.summary.starts_with("Search results for \"rust language\" as of "));
    assert!(outcome.summary.contains("[2] Rust Foundation\nSource: DuckDuckGo\n"));
}

#[tokio::test]
async fn failing_source_contributes_nothing() {
    let server = MockServer::start().await;
    mount_wikipedia(
        &server,
        json!({"query": {"pages": {"1": {"title": "Tokio", "index": 1, "extract": "Runtime."}}}}),
    )
    .await;
    mount_duckduckgo(&server, ResponseTemplate::new(500).set_body_string("down")).await;

    let outcome = search_for(&server).search("tokio").await.unwrap();
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].title, "Tokio");
    assert_eq!(outcome.results[0].link, "https://en.wikipedia.org/wiki/Tokio");
}

#[tokio::test]
async fn no_results_returns_placeholder() {
    let server = MockServer::start().await;
    mount_wikipedia(&server, json!({"batchcomplete": ""})).await;
    mount_duckduckgo(
        &server,
        ResponseTemplate::new(200).set_body_string("not json at all"),
    )
    .await;

    let outcome = search_for(&server).search("zzqx").await.unwrap();
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].source, PLACEHOLDER_SOURCE);
    assert!(!outcome.has_results());
    assert!(outcome.summary.contains("No results for \"zzqx\""));
}

#[tokio::test]
async fn query_is_url_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("gsrsearch", "c++ & rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"query": {"pages": {"1": {"title": "C++", "index": 1}}}}),
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_duckduckgo(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let outcome = search_for(&server).search("  c++ & rust ").await.unwrap();
    assert_eq!(outcome.results[0].title, "C++");
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let server = MockServer::start().await;
    let err = search_for(&server).search("   ").await.unwrap_err();
    assert!(matches!(err, ParleyError::InvalidRequest(_)));
}
