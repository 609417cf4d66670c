// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the store, the generation session and the adapters.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ParleyError;

/// Title given to freshly created chat sessions.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Where a local Ollama server listens unless configured otherwise.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Context window assumed for models we know nothing about.
pub const DEFAULT_CONTEXT_SIZE: u32 = 4096;

/// Unique identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh random (UUID v4) session id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a message within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generates a fresh random (UUID v4) message id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Author of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds, set at creation.
    pub timestamp: i64,
}

impl Message {
    /// Creates a message with a fresh id and the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            timestamp: now_millis(),
        }
    }
}

/// An ordered conversation with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: SessionId,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ChatSession {
    /// Creates an empty session titled [`DEFAULT_SESSION_TITLE`].
    pub fn new() -> Self {
        let now = now_millis();
        Self {
            id: SessionId::new(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Bumps `updated_at` without letting it move backwards.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of a `POST /api/generate` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    /// Forwarded as-is; only checked to be positive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u32>,
}

impl GenerateRequest {
    /// Builds a streaming request.
    pub fn streaming(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
            context_length: None,
        }
    }

    pub fn with_context_length(mut self, context_length: u32) -> Self {
        self.context_length = Some(context_length);
        self
    }

    /// Rejects requests that must never reach the endpoint.
    pub fn validate(&self) -> Result<(), ParleyError> {
        if self.model.trim().is_empty() {
            return Err(ParleyError::InvalidRequest("model must not be empty".into()));
        }
        if self.prompt.trim().is_empty() {
            return Err(ParleyError::InvalidRequest("prompt must not be empty".into()));
        }
        if self.context_length == Some(0) {
            return Err(ParleyError::InvalidRequest(
                "context_length must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// What is known about a locally installed model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub parameter_size: Option<String>,
    pub context_length: u32,
}

/// One web search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub source: String,
}

/// `source` of the stand-in result returned when a search finds nothing.
pub const PLACEHOLDER_SOURCE: &str = "Search System";

/// Results of a web search plus the prompt-ready summary built from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub summary: String,
}

impl SearchOutcome {
    /// True when at least one result came from a real source rather than
    /// the "no results" placeholder.
    pub fn has_results(&self) -> bool {
        self.results.iter().any(|r| r.source != PLACEHOLDER_SOURCE)
    }
}

/// Persisted model preferences, stored under the `model-store` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    pub selected_model: Option<String>,
    pub ollama_endpoint: String,
    pub selected_context_size: u32,
    pub models_info: HashMap<String, ModelInfo>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            selected_model: None,
            ollama_endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            selected_context_size: DEFAULT_CONTEXT_SIZE,
            models_info: HashMap::new(),
        }
    }
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Backend,
    Search,
    Persistence,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Raw response body of a streaming generation.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ParleyError>> + Send>>;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
