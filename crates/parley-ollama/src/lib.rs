// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama backend for Parley.
//!
//! [`OllamaClient`] implements [`GenerationBackend`](parley_core::GenerationBackend)
//! over the native Ollama HTTP API, and [`ChunkDecoder`] turns the raw
//! newline-delimited JSON body of a streaming generation into text fragments.

pub mod client;
pub mod decoder;
pub mod models;
pub mod types;

pub use client::OllamaClient;
pub use decoder::{ChunkDecoder, Record, SkipReason, decode_line, strip_control_chars};
pub use models::{estimate_context_length, parse_parameter_size};
pub use types::{ModelDetails, TagModel};
