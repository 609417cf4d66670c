// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State machine for one streaming generation.
//!
//! A generation moves `Pending -> Streaming -> {Completed, Cancelled, Failed}`,
//! or straight from `Pending` to `Cancelled`/`Failed` when the request never
//! produces a body. While streaming, the accumulated text is written into a
//! single assistant message addressed by id, so other writes to the chat
//! (a new user message, a status line) cannot redirect the stream.
//!
//! Both suspension points (sending the request, reading the next chunk) race
//! the generation's cancellation token with cancellation taking priority.
//! Dropping the request future aborts the HTTP call.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use parley_core::{
    ConversationStore, GenerateRequest, GenerationBackend, MessageId, ParleyError, Role,
    SessionId,
};
use parley_ollama::{ChunkDecoder, Record, SkipReason};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::registry::GenerationGuard;

/// Appended once to the partial answer when the user stops a generation.
pub const STOPPED_MARKER: &str = "\n\n[Generation stopped by user]";

/// Shown in place of an answer when nothing could be generated.
pub const ERROR_NOTICE: &str = "Sorry, there was an error generating the response.";

/// States in the generation FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// Request sent, no response yet.
    Pending,
    /// Body is arriving and being written into the assistant message.
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationState::Completed | GenerationState::Cancelled | GenerationState::Failed
        )
    }
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationState::Pending => write!(f, "pending"),
            GenerationState::Streaming => write!(f, "streaming"),
            GenerationState::Completed => write!(f, "completed"),
            GenerationState::Cancelled => write!(f, "cancelled"),
            GenerationState::Failed => write!(f, "failed"),
        }
    }
}

/// How a generation ended.
#[derive(Debug)]
pub struct GenerationReport {
    /// Always terminal.
    pub state: GenerationState,
    /// Final content of the assistant message written by this generation
    /// (the error notice on failure), empty if nothing was written.
    pub text: String,
    /// The assistant message written by this generation, if any.
    pub message_id: Option<MessageId>,
    /// `RequestFailed`, `StreamReadFailed` or `Cancelled`; `None` when completed.
    pub error: Option<ParleyError>,
}

impl GenerationReport {
    pub fn is_completed(&self) -> bool {
        self.state == GenerationState::Completed
    }
}

/// Drives one request against a [`GenerationBackend`] and mirrors the
/// streamed answer into a [`ConversationStore`].
pub struct GenerationSession {
    store: Arc<dyn ConversationStore>,
    backend: Arc<dyn GenerationBackend>,
    guard: GenerationGuard,
    state: GenerationState,
    accumulated: String,
    message_id: Option<MessageId>,
    /// Status message removed when the answer starts (or the request ends
    /// without one).
    transient: Option<MessageId>,
    observer: Option<mpsc::UnboundedSender<String>>,
}

impl GenerationSession {
    /// Creates a session writing into the chat the guard was acquired for.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        backend: Arc<dyn GenerationBackend>,
        guard: GenerationGuard,
    ) -> Self {
        Self {
            store,
            backend,
            guard,
            state: GenerationState::Pending,
            accumulated: String::new(),
            message_id: None,
            transient: None,
            observer: None,
        }
    }

    /// Forwards each fragment to `observer` as it is decoded.
    pub fn with_observer(mut self, observer: mpsc::UnboundedSender<String>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Removes `message_id` from the chat once the answer starts streaming.
    pub fn with_transient_status(mut self, message_id: MessageId) -> Self {
        self.transient = Some(message_id);
        self
    }

    pub fn session_id(&self) -> &SessionId {
        self.guard.session_id()
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Runs the generation to a terminal state.
    ///
    /// Returns `Err` only for [`ParleyError::InvalidRequest`], before anything
    /// is sent or written. Every other outcome is reported in the
    /// [`GenerationReport`].
    pub async fn run(mut self, request: GenerateRequest) -> Result<GenerationReport, ParleyError> {
        request.validate()?;

        let cancel = self.guard.token().clone();
        let backend = Arc::clone(&self.backend);
        info!(
            session_id = %self.session_id(),
            model = %request.model,
            context_length = ?request.context_length,
            "generation started"
        );

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = backend.stream_generate(&request) => Some(result),
        };
        let mut stream = match opened {
            None => return Ok(self.cancel_pending().await),
            Some(Err(e)) => return Ok(self.fail_pending(e).await),
            Some(Ok(stream)) => stream,
        };

        if !self.enter_streaming().await {
            return Ok(self.abandon().await);
        }

        let mut decoder = ChunkDecoder::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.cancel_streaming().await),
                next = stream.next() => next,
            };
            match next {
                Some(Ok(bytes)) => {
                    for record in decoder.push(&bytes) {
                        if !self.apply(record).await {
                            return Ok(self.abandon().await);
                        }
                    }
                }
                Some(Err(e)) => return Ok(self.fail_streaming(e).await),
                None => {
                    if let Some(record) = decoder.finish() {
                        if !self.apply(record).await {
                            return Ok(self.abandon().await);
                        }
                    }
                    return Ok(self.complete().await);
                }
            }
        }
    }

    /// Retires the status line and opens the empty assistant message.
    /// Returns false when the chat no longer exists.
    async fn enter_streaming(&mut self) -> bool {
        self.retire_transient().await;
        let Some(id) = self
            .store
            .append_message(self.guard.session_id(), Role::Assistant, "")
            .await
        else {
            return false;
        };
        debug!(session_id = %self.session_id(), message_id = %id, "streaming started");
        self.message_id = Some(id);
        self.state = GenerationState::Streaming;
        true
    }

    /// Folds one decoded record into the message. Returns false when the
    /// target message has disappeared.
    async fn apply(&mut self, record: Record) -> bool {
        match record {
            Record::Fragment(text) => {
                self.accumulated.push_str(&text);
                if let Some(observer) = &self.observer {
                    let _ = observer.send(text);
                }
                self.write_accumulated().await
            }
            Record::Skipped(SkipReason::ProviderError(message)) => {
                warn!(session_id = %self.session_id(), error = %message, "provider reported an error mid-stream");
                true
            }
            Record::Skipped(_) => true,
        }
    }

    async fn write_accumulated(&self) -> bool {
        match &self.message_id {
            Some(id) => {
                self.store
                    .replace_message_content(self.guard.session_id(), id, &self.accumulated)
                    .await
            }
            None => false,
        }
    }

    async fn retire_transient(&mut self) {
        if let Some(id) = self.transient.take() {
            self.store
                .remove_message(self.guard.session_id(), &id)
                .await;
        }
    }

    async fn complete(mut self) -> GenerationReport {
        self.state = GenerationState::Completed;
        info!(
            session_id = %self.session_id(),
            chars = self.accumulated.chars().count(),
            "generation completed"
        );
        self.report(None).await
    }

    async fn cancel_pending(mut self) -> GenerationReport {
        self.retire_transient().await;
        self.state = GenerationState::Cancelled;
        info!(session_id = %self.session_id(), "generation cancelled before response");
        self.report(Some(ParleyError::Cancelled)).await
    }

    async fn cancel_streaming(mut self) -> GenerationReport {
        self.accumulated.push_str(STOPPED_MARKER);
        self.write_accumulated().await;
        self.state = GenerationState::Cancelled;
        info!(session_id = %self.session_id(), "generation stopped by user");
        self.report(Some(ParleyError::Cancelled)).await
    }

    async fn fail_pending(mut self, error: ParleyError) -> GenerationReport {
        warn!(session_id = %self.session_id(), error = %error, "generation request failed");
        self.retire_transient().await;
        self.post_notice().await;
        self.state = GenerationState::Failed;
        self.report(Some(error)).await
    }

    async fn fail_streaming(mut self, error: ParleyError) -> GenerationReport {
        warn!(session_id = %self.session_id(), error = %error, "generation stream failed");
        if self.accumulated.is_empty() {
            if let Some(id) = self.message_id.take() {
                self.store
                    .remove_message(self.guard.session_id(), &id)
                    .await;
            }
            self.post_notice().await;
        }
        self.state = GenerationState::Failed;
        self.report(Some(error)).await
    }

    /// The chat or its message was deleted underneath the stream.
    async fn abandon(mut self) -> GenerationReport {
        self.retire_transient().await;
        self.state = GenerationState::Cancelled;
        self.message_id = None;
        self.accumulated.clear();
        warn!(session_id = %self.session_id(), "chat removed during generation, stream abandoned");
        self.report(Some(ParleyError::Cancelled)).await
    }

    async fn post_notice(&mut self) {
        self.message_id = self
            .store
            .append_message(self.guard.session_id(), Role::Assistant, ERROR_NOTICE)
            .await;
        if self.message_id.is_some() {
            self.accumulated = ERROR_NOTICE.to_string();
        }
    }

    /// Flushes throttled store writes so the final content is persisted.
    async fn report(self, error: Option<ParleyError>) -> GenerationReport {
        debug_assert!(self.state.is_terminal());
        self.store.flush().await;
        GenerationReport {
            state: self.state,
            text: self.accumulated,
            message_id: self.message_id,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::GenerationRegistry;
    use parley_store::MemoryConversationStore;
    use parley_test_utils::{MockBackend, Script};

    #[test]
    fn terminal_states() {
        assert!(!GenerationState::Pending.is_terminal());
        assert!(!GenerationState::Streaming.is_terminal());
        assert!(GenerationState::Completed.is_terminal());
        assert!(GenerationState::Cancelled.is_terminal());
        assert!(GenerationState::Failed.is_terminal());
        assert_eq!(GenerationState::Streaming.to_string(), "streaming");
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn request_failure_is_logged() {
        let store = Arc::new(MemoryConversationStore::new());
        let chat = store.create_session().await;
        let backend = Arc::new(MockBackend::with_scripts(vec![Script::RequestError(
            "connection refused".into(),
        )]));
        let registry = GenerationRegistry::new();
        let guard = registry.acquire(&chat).unwrap();

        let report = GenerationSession::new(store, backend, guard)
            .run(GenerateRequest::streaming("llama3", "hi"))
            .await
            .unwrap();

        assert_eq!(report.state, GenerationState::Failed);
        assert!(logs_contain("generation request failed"));
        assert!(logs_contain("connection refused"));
    }
}
