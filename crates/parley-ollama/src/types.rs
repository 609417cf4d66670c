// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Ollama HTTP API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One line of a `/api/generate` stream, or the whole non-streaming body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagModel>,
}

/// An installed model as listed by `/api/tags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagModel {
    pub name: String,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub details: Option<ModelDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub families: Option<Vec<String>>,
    #[serde(default)]
    pub parameter_size: Option<String>,
    #[serde(default)]
    pub quantization_level: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowRequest<'a> {
    pub name: &'a str,
}

/// Body of `POST /api/show`. Only the fields used for sizing are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowResponse {
    #[serde(default)]
    pub details: Option<ModelDetails>,
    /// GGUF metadata, e.g. `general.parameter_count`.
    #[serde(default)]
    pub model_info: HashMap<String, serde_json::Value>,
}

impl ShowResponse {
    pub fn family(&self) -> Option<&str> {
        self.details.as_ref()?.family.as_deref()
    }

    /// Parameter count from GGUF metadata, else parsed from the `8.0B`-style
    /// size label.
    pub fn parameter_count(&self) -> Option<u64> {
        self.model_info
            .get("general.parameter_count")
            .and_then(serde_json::Value::as_u64)
            .or_else(|| {
                self.details
                    .as_ref()?
                    .parameter_size
                    .as_deref()
                    .and_then(crate::models::parse_parameter_size)
            })
    }
}

/// Error body Ollama returns with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
