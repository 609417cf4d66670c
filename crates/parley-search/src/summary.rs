// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merging raw results and rendering the prompt-ready summary.

use std::collections::HashSet;
use std::fmt::Write;

use chrono::NaiveDate;
use parley_core::{PLACEHOLDER_SOURCE, SearchResult};

/// Combines per-source results: Wikipedia first, then DuckDuckGo, first
/// occurrence of each link wins, at most `max_results` kept.
///
/// Never returns an empty list; with nothing found the single
/// [`placeholder_result`] is returned instead.
pub fn merge_results(
    query: &str,
    wikipedia: Vec<SearchResult>,
    duckduckgo: Vec<SearchResult>,
    max_results: usize,
) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut merged: Vec<SearchResult> = wikipedia
        .into_iter()
        .chain(duckduckgo)
        .filter(|r| !r.link.is_empty() && seen.insert(r.link.clone()))
        .take(max_results)
        .collect();

    if merged.is_empty() {
        merged.push(placeholder_result(query));
    }
    merged
}

/// The stand-in result pointing at a manual DuckDuckGo search.
pub fn placeholder_result(query: &str) -> SearchResult {
    SearchResult {
        title: format!("No results for \"{query}\""),
        link: format!("https://duckduckgo.com/?q={}", urlencoding::encode(query)),
        snippet: no_results_message(query),
        source: PLACEHOLDER_SOURCE.to_string(),
    }
}

/// Shown to the user when a search turns up nothing usable.
pub fn no_results_message(query: &str) -> String {
    format!(
        "No results found for \"{query}\". Try rephrasing your query or visit DuckDuckGo for manual search."
    )
}

/// Renders results as numbered blocks followed by a note telling the model
/// how to use them.
pub fn build_summary(query: &str, results: &[SearchResult], date: NaiveDate) -> String {
    if results.is_empty() {
        return format!("No results found for \"{query}\".");
    }

    let mut summary = format!(
        "Search results for \"{query}\" as of {}:\n\n",
        date.format("%Y-%m-%d")
    );
    for (i, result) in results.iter().enumerate() {
        let source = if result.source.is_empty() {
            "Web"
        } else {
            result.source.as_str()
        };
        // Writing to a String cannot fail.
        let _ = write!(
            summary,
            "[{}] {}\nSource: {source}\nURL: {}\n{}\n\n",
            i + 1,
            result.title,
            result.link,
            result.snippet
        );
    }
    summary.push_str("---\n");
    let _ = write!(
        summary,
        "These search results are provided to help answer the user's query about \"{query}\". \
         Please use this information to form a comprehensive response. \
         If the information is insufficient, you may acknowledge the limitations in the search results."
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, link: &str, source: &str) -> SearchResult {
        SearchResult {
            title: title.into(),
            link: link.into(),
            snippet: format!("about {title}"),
            source: source.into(),
        }
    }

    #[test]
    fn wikipedia_comes_first_and_links_are_deduplicated() {
        let merged = merge_results(
            "q",
            vec![result("W1", "https://a", "Wikipedia")],
            vec![
                result("D1", "https://a", "DuckDuckGo"),
                result("D2", "https://b", "DuckDuckGo"),
            ],
            10,
        );
        let titles: Vec<_> = merged.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["W1", "D2"]);
    }

    #[test]
    fn merged_results_are_capped() {
        let ddg = (0..20)
            .map(|i| result(&format!("D{i}"), &format!("https://d/{i}"), "DuckDuckGo"))
            .collect();
        assert_eq!(merge_results("q", Vec::new(), ddg, 10).len(), 10);
    }

    #[test]
    fn nothing_found_yields_placeholder() {
        let merged = merge_results("rust lang", Vec::new(), Vec::new(), 10);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, PLACEHOLDER_SOURCE);
        assert_eq!(merged[0].title, "No results for \"rust lang\"");
        assert_eq!(merged[0].link, "https://duckduckgo.com/?q=rust%20lang");
        assert_eq!(
            merged[0].snippet,
            "No results found for \"rust lang\". Try rephrasing your query or visit DuckDuckGo for manual search."
        );
    }

    #[test]
    fn summary_lists_results_with_date_and_closing_note() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let results = vec![
            result("Rust", "https://rust-lang.org", "Wikipedia"),
            result("Cargo", "https://doc.rust-lang.org/cargo", ""),
        ];
        let summary = build_summary("rust", &results, date);

        assert!(summary.starts_with("Search results for \"rust\" as of 2026-03-07:\n\n"));
        assert!(summary.contains(
            "[1] Rust\nSource: Wikipedia\nURL: https://rust-lang.org\nabout Rust\n\n"
        ));
        assert!(summary.contains("[2] Cargo\nSource: Web\n"));
        assert!(summary.contains("---\nThese search results are provided to help answer the user's query about \"rust\". "));
        assert!(summary.ends_with("acknowledge the limitations in the search results."));
    }

    #[test]
    fn empty_summary() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(build_summary("x", &[], date), "No results found for \"x\".");
    }
}
