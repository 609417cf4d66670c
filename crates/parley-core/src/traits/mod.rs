// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between Parley crates.
//!
//! Adapters extend the [`PluginAdapter`] base trait and use `#[async_trait]`
//! so they can be held as `Arc<dyn Trait>`.

pub mod adapter;
pub mod backend;
pub mod extractor;
pub mod persistence;
pub mod search;
pub mod store;

pub use adapter::PluginAdapter;
pub use backend::GenerationBackend;
pub use extractor::{ContentExtractor, EXTRACTION_ERROR_PREFIX, is_extraction_error};
pub use persistence::StatePersistence;
pub use search::SearchProvider;
pub use store::ConversationStore;
