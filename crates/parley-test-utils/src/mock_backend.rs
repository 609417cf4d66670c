// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation backend for deterministic testing.
//!
//! `MockBackend` implements `GenerationBackend` by replaying scripted byte
//! chunks, so tests can drive every transition of a generation (clean end,
//! failed request, broken stream, a stream that stalls until cancelled).

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};
use tokio::sync::Mutex;

use parley_core::{
    AdapterType, ByteStream, GenerateRequest, GenerationBackend, HealthStatus, ParleyError,
    PluginAdapter,
};
use parley_ollama::{ChunkDecoder, Record};

/// What the backend does for one request.
#[derive(Debug, Clone)]
pub enum Script {
    /// Stream the chunks, then end cleanly.
    Chunks(Vec<Vec<u8>>),
    /// Stream the chunks, then fail the next read with this message.
    ChunksThenError(Vec<Vec<u8>>, String),
    /// Reject the request before any body arrives.
    RequestError(String),
    /// Stream the chunks, then stall forever.
    ChunksThenPending(Vec<Vec<u8>>),
    /// Never answer the request.
    NeverRespond,
}

/// Encodes `fragments` as Ollama NDJSON lines followed by the `done` line,
/// in a single chunk.
pub fn ndjson(fragments: &[&str]) -> Vec<u8> {
    let mut body = String::new();
    for fragment in fragments {
        body.push_str(&serde_json::json!({ "response": fragment, "done": false }).to_string());
        body.push('\n');
    }
    body.push_str(r#"{"response":"","done":true}"#);
    body.push('\n');
    body.into_bytes()
}

/// A backend that replays scripts popped from a FIFO queue.
///
/// When the queue is empty a single `"mock response"` fragment is streamed.
pub struct MockBackend {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_scripts(Vec::new())
    }

    pub fn with_scripts(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(VecDeque::from(scripts))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// One request streaming each fragment as its own line-sized chunk.
    pub fn streaming(fragments: &[&str]) -> Self {
        let chunks = fragments.iter().map(|f| ndjson_line(f)).collect();
        Self::with_scripts(vec![Script::Chunks(chunks)])
    }

    pub async fn push(&self, script: Script) {
        self.scripts.lock().await.push_back(script);
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_script(&self, request: &GenerateRequest) -> Script {
        self.requests.lock().await.push(request.clone());
        self.scripts
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Script::Chunks(vec![ndjson(&["mock response"])]))
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// A single NDJSON line carrying `fragment`.
pub fn ndjson_line(fragment: &str) -> Vec<u8> {
    let mut line = serde_json::json!({ "response": fragment, "done": false }).to_string();
    line.push('\n');
    line.into_bytes()
}

fn chunk_stream(chunks: Vec<Vec<u8>>) -> impl futures::Stream<Item = Result<Bytes, ParleyError>> {
    stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ParleyError> {
        request.validate()?;
        let chunks = match self.next_script(request).await {
            Script::Chunks(chunks) | Script::ChunksThenPending(chunks) => chunks,
            Script::ChunksThenError(_, message) | Script::RequestError(message) => {
                return Err(ParleyError::RequestFailed {
                    message,
                    source: None,
                });
            }
            Script::NeverRespond => std::future::pending().await,
        };

        let mut decoder = ChunkDecoder::new();
        let mut text = String::new();
        for chunk in &chunks {
            text.extend(decoder.push(chunk).into_iter().filter_map(Record::into_fragment));
        }
        text.extend(decoder.finish().and_then(Record::into_fragment));
        Ok(text)
    }

    async fn stream_generate(&self, request: &GenerateRequest) -> Result<ByteStream, ParleyError> {
        request.validate()?;
        match self.next_script(request).await {
            Script::Chunks(chunks) => Ok(Box::pin(chunk_stream(chunks))),
            Script::ChunksThenError(chunks, message) => {
                let failure = stream::once(async move {
                    Err(ParleyError::StreamReadFailed {
                        message,
                        source: None,
                    })
                });
                Ok(Box::pin(chunk_stream(chunks).chain(failure)))
            }
            Script::RequestError(message) => Err(ParleyError::RequestFailed {
                message,
                source: None,
            }),
            Script::ChunksThenPending(chunks) => {
                Ok(Box::pin(chunk_stream(chunks).chain(stream::pending())))
            }
            Script::NeverRespond => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(backend: &MockBackend) -> Result<Vec<Bytes>, ParleyError> {
        let request = GenerateRequest::streaming("m", "p");
        let stream = backend.stream_generate(&request).await?;
        stream.collect::<Vec<_>>().await.into_iter().collect()
    }

    #[tokio::test]
    async fn default_script_streams_mock_response() {
        let backend = MockBackend::new();
        let text = backend
            .generate(&GenerateRequest::streaming("m", "p"))
            .await
            .unwrap();
        assert_eq!(text, "mock response");
    }

    #[tokio::test]
    async fn scripts_replay_in_order_and_requests_are_recorded() {
        let backend = MockBackend::with_scripts(vec![
            Script::Chunks(vec![ndjson(&["a", "b"])]),
            Script::RequestError("boom".into()),
        ]);

        let chunks = collect(&backend).await.unwrap();
        assert_eq!(chunks.len(), 1);

        let err = collect(&backend).await.unwrap_err();
        assert!(matches!(err, ParleyError::RequestFailed { .. }));
        assert_eq!(backend.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn read_error_follows_chunks() {
        let backend = MockBackend::with_scripts(vec![Script::ChunksThenError(
            vec![ndjson_line("x")],
            "reset".into(),
        )]);
        let request = GenerateRequest::streaming("m", "p");
        let mut stream = backend.stream_generate(&request).await.unwrap();
        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(
            stream.next().await.unwrap(),
            Err(ParleyError::StreamReadFailed { .. })
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_without_consuming_a_script() {
        let backend = MockBackend::streaming(&["x"]);
        let err = backend
            .stream_generate(&GenerateRequest::streaming("", "p"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ParleyError::InvalidRequest(_)));
        assert!(backend.requests().await.is_empty());
    }

    #[test]
    fn ndjson_ends_with_done_line() {
        let body = String::from_utf8(ndjson(&["hi \"there\""])).unwrap();
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#"hi \"there\""#));
        assert!(lines[1].contains(r#""done":true"#));
    }
}
