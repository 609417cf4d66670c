// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Parley.
//!
//! This crate provides the error type, the domain types (sessions, messages,
//! generation requests) and the trait seams shared by the rest of the
//! workspace. Backends, stores and search providers implement traits defined
//! here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ParleyError;
pub use types::{
    AdapterType, ByteStream, ChatSession, DEFAULT_CONTEXT_SIZE, DEFAULT_OLLAMA_ENDPOINT,
    DEFAULT_SESSION_TITLE, GenerateRequest, HealthStatus, Message, MessageId, ModelInfo,
    ModelSettings, PLACEHOLDER_SOURCE, Role, SearchOutcome, SearchResult, SessionId, now_millis,
};

pub use traits::{
    ContentExtractor, ConversationStore, EXTRACTION_ERROR_PREFIX, GenerationBackend,
    PluginAdapter, SearchProvider, StatePersistence, is_extraction_error,
};
