// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat orchestration: validates a send, records the user message and runs
//! a [`GenerationSession`] for the answer.

use std::path::PathBuf;
use std::sync::Arc;

use parley_context::{ContextMeter, ContextUsage};
use parley_core::{
    ContentExtractor, ConversationStore, GenerateRequest, GenerationBackend, ParleyError, Role,
    SearchProvider, SessionId,
};
use parley_store::SettingsStore;
use tokio::sync::mpsc;
use tracing::debug;

use crate::extract::PlainTextExtractor;
use crate::generation::{GenerationReport, GenerationSession};
use crate::prompt::{attachment_tokens, prepare_message};
use crate::registry::GenerationRegistry;

/// Owns the shared pieces a chat turn needs.
pub struct ChatController {
    pub(crate) store: Arc<dyn ConversationStore>,
    pub(crate) settings: Arc<SettingsStore>,
    pub(crate) backend: Arc<dyn GenerationBackend>,
    pub(crate) extractor: Arc<dyn ContentExtractor>,
    pub(crate) search: Option<Arc<dyn SearchProvider>>,
    pub(crate) registry: GenerationRegistry,
}

impl ChatController {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        settings: Arc<SettingsStore>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            store,
            settings,
            backend,
            extractor: Arc::new(PlainTextExtractor::new()),
            search: None,
            registry: GenerationRegistry::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn registry(&self) -> &GenerationRegistry {
        &self.registry
    }

    pub fn search_enabled(&self) -> bool {
        self.search.is_some()
    }

    /// Stops the generation running in `session_id`, if any.
    pub fn cancel(&self, session_id: &SessionId) -> bool {
        self.registry.cancel(session_id)
    }

    /// Sends `input` (plus attachments) to the selected model and streams
    /// the answer into the chat.
    ///
    /// Rejections (`InvalidRequest`, `SessionBusy`) happen before the chat
    /// is touched.
    pub async fn send_message(
        &self,
        session_id: &SessionId,
        input: &str,
        attachments: &[PathBuf],
        observer: Option<mpsc::UnboundedSender<String>>,
    ) -> Result<GenerationReport, ParleyError> {
        let model = self.require_model().await?;
        let prepared = prepare_message(input, attachments, self.extractor.as_ref()).await?;
        let request = self.request(model, prepared.prompt).await;
        request.validate()?;

        let guard = self.registry.acquire(session_id)?;
        self.store
            .append_message(session_id, Role::User, &prepared.display)
            .await
            .ok_or_else(|| unknown_session(session_id))?;
        debug!(session_id = %session_id, attachments = attachments.len(), "user message recorded");

        let mut generation =
            GenerationSession::new(Arc::clone(&self.store), Arc::clone(&self.backend), guard);
        if let Some(observer) = observer {
            generation = generation.with_observer(observer);
        }
        generation.run(request).await
    }

    /// Estimated context usage of the chat plus a pending input.
    pub async fn usage(
        &self,
        session_id: &SessionId,
        input: &str,
        attachments: &[PathBuf],
    ) -> ContextUsage {
        let messages = self
            .store
            .session(session_id)
            .await
            .map(|s| s.messages)
            .unwrap_or_default();
        let meter = ContextMeter::new(self.settings.context_size().await);
        meter.measure(&messages, input, attachment_tokens(attachments))
    }

    pub(crate) async fn require_model(&self) -> Result<String, ParleyError> {
        self.settings
            .selected_model()
            .await
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ParleyError::InvalidRequest("no model selected".into()))
    }

    pub(crate) async fn request(&self, model: String, prompt: String) -> GenerateRequest {
        GenerateRequest::streaming(model, prompt)
            .with_context_length(self.settings.context_size().await)
    }
}

pub(crate) fn unknown_session(session_id: &SessionId) -> ParleyError {
    ParleyError::InvalidRequest(format!("unknown chat session {session_id}"))
}
