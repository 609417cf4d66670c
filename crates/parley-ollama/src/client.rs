// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a local Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parley_config::model::OllamaConfig;
use parley_core::{
    AdapterType, ByteStream, GenerateRequest, GenerationBackend, HealthStatus, ModelInfo,
    ParleyError, PluginAdapter,
};
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::models::estimate_context_length;
use crate::types::{ApiErrorBody, GenerateChunk, ShowRequest, ShowResponse, TagModel, TagsResponse};

/// Talks to the Ollama `/api/generate`, `/api/tags` and `/api/show` endpoints.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OllamaClient {
    /// Builds a client for `endpoint` (e.g. `http://localhost:11434`).
    ///
    /// `connect_timeout` bounds establishing the connection only. A response
    /// body may stream for as long as the server keeps producing it.
    pub fn new(endpoint: &str, connect_timeout: Duration) -> Result<Self, ParleyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ParleyError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: normalize_endpoint(endpoint),
        })
    }

    pub fn from_config(config: &OllamaConfig) -> Result<Self, ParleyError> {
        Self::new(
            &config.endpoint,
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    /// Same connection pool, different server.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = normalize_endpoint(endpoint);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    /// Lists installed models.
    pub async fn list_models(&self) -> Result<Vec<TagModel>, ParleyError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(request_failed)?;
        let response = ensure_success(response).await?;
        let tags: TagsResponse = response.json().await.map_err(|e| ParleyError::RequestFailed {
            message: format!("failed to parse model list: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(count = tags.models.len(), "models listed");
        Ok(tags.models)
    }

    /// Fetches model details and derives an estimated context length.
    pub async fn show_model(&self, name: &str) -> Result<ModelInfo, ParleyError> {
        let response = self
            .client
            .post(self.url("/api/show"))
            .json(&ShowRequest { name })
            .send()
            .await
            .map_err(request_failed)?;
        let response = ensure_success(response).await?;
        let show: ShowResponse = response.json().await.map_err(|e| ParleyError::RequestFailed {
            message: format!("failed to parse model details: {e}"),
            source: Some(Box::new(e)),
        })?;

        let parameters = show.parameter_count();
        let context_length = estimate_context_length(show.family(), parameters);
        debug!(model = %name, ?parameters, context_length, "model details fetched");

        Ok(ModelInfo {
            name: name.to_string(),
            family: show.family().map(str::to_string),
            parameter_size: show
                .details
                .as_ref()
                .and_then(|d| d.parameter_size.clone()),
            context_length,
        })
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

fn request_failed(e: reqwest::Error) -> ParleyError {
    ParleyError::RequestFailed {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Passes 2xx responses through; turns anything else into `RequestFailed`
/// carrying the response body.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ParleyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ParleyError::RequestFailed {
        message: status_message(status, &body),
        source: None,
    })
}

fn status_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(api) => format!("Ollama returned {status}: {}", api.error),
        Err(_) if body.trim().is_empty() => format!("Ollama returned {status}"),
        Err(_) => format!("Ollama returned {status}: {}", body.trim()),
    }
}

#[async_trait]
impl PluginAdapter for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        match self.list_models().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ParleyError> {
        request.validate()?;
        let mut req = request.clone();
        req.stream = false;

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&req)
            .send()
            .await
            .map_err(request_failed)?;
        let response = ensure_success(response).await?;
        let chunk: GenerateChunk = response.json().await.map_err(|e| {
            ParleyError::StreamReadFailed {
                message: format!("failed to read generation response: {e}"),
                source: Some(Box::new(e)),
            }
        })?;
        if let Some(error) = chunk.error {
            return Err(ParleyError::RequestFailed {
                message: error,
                source: None,
            });
        }
        Ok(chunk.response.unwrap_or_default())
    }

    async fn stream_generate(&self, request: &GenerateRequest) -> Result<ByteStream, ParleyError> {
        request.validate()?;
        let mut req = request.clone();
        req.stream = true;

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&req)
            .send()
            .await
            .map_err(request_failed)?;
        let response = ensure_success(response).await?;
        info!(model = %req.model, status = %response.status(), "generation stream opened");

        let body = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| ParleyError::StreamReadFailed {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })
        });
        Ok(Box::pin(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(uri: &str) -> OllamaClient {
        OllamaClient::new(uri, Duration::from_secs(5)).unwrap()
    }

    async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[test]
    fn endpoint_is_normalized() {
        let client = test_client("http://localhost:11434/ ");
        assert_eq!(client.endpoint(), "http://localhost:11434");
        let client = client.with_endpoint("http://gpu:11434/");
        assert_eq!(client.url("/api/tags"), "http://gpu:11434/api/tags");
    }

    #[tokio::test]
    async fn generate_returns_response_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({"model": "llama3", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3",
                "response": "Hi there",
                "done": true
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client
            .generate(&GenerateRequest::streaming("llama3", "hello"))
            .await
            .unwrap();
        assert_eq!(text, "Hi there");
    }

    #[tokio::test]
    async fn stream_generate_yields_raw_body() {
        let server = MockServer::start().await;
        let body = "{\"response\":\"He\"}\n{\"response\":\"llo\"}\n{\"response\":\"\",\"done\":true}\n";
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({"stream": true, "context_length": 8192})))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let request = GenerateRequest::streaming("llama3", "hello").with_context_length(8192);
        let stream = client.stream_generate(&request).await.unwrap();
        assert_eq!(collect(stream).await, body.as_bytes());
    }

    #[tokio::test]
    async fn non_success_status_is_request_failed_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "model 'nope' not found"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = match client
            .stream_generate(&GenerateRequest::streaming("nope", "hello"))
            .await
        {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert!(matches!(err, ParleyError::RequestFailed { .. }));
        assert!(err.to_string().contains("model 'nope' not found"), "got: {err}");
    }

    #[tokio::test]
    async fn unreachable_server_is_request_failed() {
        let client = test_client("http://127.0.0.1:9");
        let err = client
            .generate(&GenerateRequest::streaming("llama3", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::RequestFailed { .. }));
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client
            .stream_generate(&GenerateRequest::streaming("", "hello"))
            .await;
        assert!(matches!(result, Err(ParleyError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn list_models_parses_tags() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    {"name": "llama3:8b", "size": 4661224676u64,
                     "details": {"family": "llama", "parameter_size": "8.0B"}},
                    {"name": "gemma:2b"}
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let models = client.list_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "llama3:8b");
        assert_eq!(
            models[0].details.as_ref().unwrap().parameter_size.as_deref(),
            Some("8.0B")
        );
        assert_eq!(client.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn show_model_estimates_context_length() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/show"))
            .and(body_partial_json(serde_json::json!({"name": "llama3:70b"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "details": {"family": "llama", "parameter_size": "70.6B"},
                "model_info": {"general.parameter_count": 70553706496u64}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let info = client.show_model("llama3:70b").await.unwrap();
        assert_eq!(info.context_length, 32768);
        assert_eq!(info.family.as_deref(), Some("llama"));
        assert_eq!(info.parameter_size.as_deref(), Some("70.6B"));
    }

    #[tokio::test]
    async fn health_check_reports_unhealthy_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(matches!(
            client.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}
