// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-generation backend trait.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ByteStream, GenerateRequest};

/// A text-generation endpoint.
///
/// `stream_generate` resolves once the endpoint has answered with a success
/// status; the returned stream then yields raw body chunks. A non-success
/// answer or a transport failure before that point is
/// [`ParleyError::RequestFailed`]; failures while reading the body surface as
/// [`ParleyError::StreamReadFailed`] items of the stream.
#[async_trait]
pub trait GenerationBackend: PluginAdapter {
    /// Sends a non-streaming request and returns the full `response` text.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ParleyError>;

    /// Sends a streaming request and returns the raw NDJSON body.
    async fn stream_generate(&self, request: &GenerateRequest)
    -> Result<ByteStream, ParleyError>;
}
