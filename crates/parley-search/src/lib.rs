// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web search for Parley.
//!
//! [`WebSearch`] asks Wikipedia and the DuckDuckGo instant answer API in
//! parallel, merges what comes back and renders a summary that can be fed
//! to a model as context. A source that fails contributes nothing; when
//! nothing is found at all a single placeholder result points the user at
//! the DuckDuckGo search page.

pub mod duckduckgo;
mod fetch;
pub mod summary;
pub mod web;
pub mod wikipedia;

pub use summary::{build_summary, merge_results, placeholder_result};
pub use web::WebSearch;
