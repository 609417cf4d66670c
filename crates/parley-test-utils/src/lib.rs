// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley.
//!
//! Provides scripted mock adapters for fast, deterministic tests without a
//! running Ollama server or network access.
//!
//! # Components
//!
//! - [`MockBackend`] - generation backend replaying scripted byte streams
//! - [`MockSearch`] - search provider returning canned results

pub mod mock_backend;
pub mod mock_search;

pub use mock_backend::{MockBackend, Script, ndjson, ndjson_line};
pub use mock_search::MockSearch;
