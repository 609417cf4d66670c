// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Parley.

use thiserror::Error;

use crate::types::SessionId;

/// The primary error type used across all Parley crates.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The generation endpoint did not return a usable success response
    /// (network error or non-2xx status).
    #[error("request failed: {message}")]
    RequestFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reading the response body failed after the request succeeded.
    #[error("stream read failed: {message}")]
    StreamReadFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The user stopped the generation.
    #[error("generation cancelled by user")]
    Cancelled,

    /// The request was rejected before anything was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A generation is already running for this chat session.
    #[error("a generation is already active for session {session_id}")]
    SessionBusy { session_id: SessionId },

    /// Web search errors (HTTP failure, unexpected payload).
    #[error("search error: {message}")]
    Search {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Returns true for the user-initiated stop, which is not a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ParleyError::Cancelled)
    }
}
