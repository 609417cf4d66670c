// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation store trait.

use async_trait::async_trait;

use crate::types::{ChatSession, MessageId, Role, SessionId};

/// Ordered chat sessions and their messages.
///
/// Operations addressing an unknown session or message are no-ops, reported
/// through the `Option`/`bool` return values rather than errors.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Creates an empty session at the head of the list and selects it.
    async fn create_session(&self) -> SessionId;

    /// Removes a session. Clears the current pointer only if it pointed at `id`.
    async fn delete_session(&self, id: &SessionId) -> bool;

    /// Sets the current pointer. Not validated until read.
    async fn select_session(&self, id: &SessionId);

    /// Appends a message with a fresh id and timestamp.
    async fn append_message(
        &self,
        session_id: &SessionId,
        role: Role,
        content: &str,
    ) -> Option<MessageId>;

    /// Overwrites the content of the last message of the session.
    async fn replace_last_message_content(&self, session_id: &SessionId, content: &str) -> bool;

    /// Overwrites the content of the message with the given id.
    async fn replace_message_content(
        &self,
        session_id: &SessionId,
        message_id: &MessageId,
        content: &str,
    ) -> bool;

    /// Removes one message from a session.
    async fn remove_message(&self, session_id: &SessionId, message_id: &MessageId) -> bool;

    async fn update_title(&self, session_id: &SessionId, title: &str) -> bool;

    async fn session(&self, id: &SessionId) -> Option<ChatSession>;

    /// All sessions, most recently created first.
    async fn sessions(&self) -> Vec<ChatSession>;

    async fn current_session_id(&self) -> Option<SessionId>;

    /// Writes out any state whose persistence was deferred. Stores that
    /// persist every mutation immediately have nothing to do.
    async fn flush(&self) {}

    /// The selected session, if the pointer refers to one that still exists.
    async fn current_session(&self) -> Option<ChatSession> {
        let id = self.current_session_id().await?;
        self.session(&id).await
    }

    /// Returns the current session, creating and selecting one when the
    /// pointer is unset or dangling.
    async fn ensure_session(&self) -> SessionId {
        if let Some(session) = self.current_session().await {
            return session.id;
        }
        match self.sessions().await.into_iter().next() {
            Some(first) => {
                self.select_session(&first.id).await;
                first.id
            }
            None => self.create_session().await,
        }
    }
}
