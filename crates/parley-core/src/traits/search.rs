// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web search provider trait.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SearchOutcome;

#[async_trait]
pub trait SearchProvider: PluginAdapter {
    /// Runs a query and returns the results plus a prompt-ready summary.
    async fn search(&self, query: &str) -> Result<SearchOutcome, ParleyError>;
}
