// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by every pluggable backend.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::{AdapterType, HealthStatus};

/// Identity and health reporting common to generation backends, search
/// providers and persistence layers.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the kind of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, ParleyError>;
}
