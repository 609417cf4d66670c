// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value persistence for application state.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;

/// Stores opaque string blobs (JSON in practice) under fixed keys.
#[async_trait]
pub trait StatePersistence: PluginAdapter {
    /// Returns the stored value, or `None` if the key was never written.
    async fn load(&self, key: &str) -> Result<Option<String>, ParleyError>;

    /// Inserts or replaces the value for `key`.
    async fn save(&self, key: &str, value: &str) -> Result<(), ParleyError>;
}
