// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation store with optional write-through persistence.
//!
//! The whole chat list lives behind one `RwLock`. Every mutation replaces the
//! affected session in place under the write guard, and when a persistence
//! backend is attached the new snapshot is written before the guard drops,
//! so snapshots reach the backend in mutation order.
//!
//! In-place content updates (one per streamed fragment) are throttled to one
//! snapshot per [`CONTENT_PERSIST_INTERVAL`]; the rest are written by the
//! next other mutation or by [`ConversationStore::flush`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parley_core::{
    ChatSession, ConversationStore, Message, MessageId, ParleyError, Role, SessionId,
    StatePersistence,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::kv::CHAT_STORE_KEY;

/// Serialized form stored under [`CHAT_STORE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub chats: Vec<ChatSession>,
    pub current_chat_id: Option<SessionId>,
}

/// Minimum gap between snapshots caused by message content replacement.
pub const CONTENT_PERSIST_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct PersistClock {
    last_saved: Option<Instant>,
    dirty: bool,
}

pub struct MemoryConversationStore {
    state: RwLock<ChatSnapshot>,
    persistence: Option<Arc<dyn StatePersistence>>,
    clock: Mutex<PersistClock>,
}

impl Default for MemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConversationStore {
    /// An empty store that keeps nothing across restarts.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ChatSnapshot::default()),
            persistence: None,
            clock: Mutex::new(PersistClock::default()),
        }
    }

    /// Restores the last snapshot from `persistence` and writes every later
    /// mutation back to it.
    ///
    /// A snapshot that no longer parses is logged and replaced by an empty
    /// store rather than failing startup.
    pub async fn load(persistence: Arc<dyn StatePersistence>) -> Result<Self, ParleyError> {
        let snapshot = match persistence.load(CHAT_STORE_KEY).await? {
            Some(raw) => serde_json::from_str::<ChatSnapshot>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unreadable chat snapshot");
                ChatSnapshot::default()
            }),
            None => ChatSnapshot::default(),
        };
        debug!(chats = snapshot.chats.len(), "conversation store loaded");
        Ok(Self {
            state: RwLock::new(snapshot),
            persistence: Some(persistence),
            clock: Mutex::new(PersistClock::default()),
        })
    }

    /// A copy of the full state.
    pub async fn snapshot(&self) -> ChatSnapshot {
        self.state.read().await.clone()
    }

    async fn persist(&self, state: &ChatSnapshot) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let raw = match serde_json::to_string(state) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to serialize chat snapshot");
                return;
            }
        };
        if let Err(e) = persistence.save(CHAT_STORE_KEY, &raw).await {
            warn!(error = %e, "failed to persist chat snapshot");
        }
        let mut clock = self.clock.lock().await;
        clock.last_saved = Some(Instant::now());
        clock.dirty = false;
    }

    /// Persists unless a snapshot was written less than
    /// [`CONTENT_PERSIST_INTERVAL`] ago, in which case the state is only
    /// marked dirty.
    async fn persist_throttled(&self, state: &ChatSnapshot) {
        if self.persistence.is_none() {
            return;
        }
        {
            let mut clock = self.clock.lock().await;
            let recent = clock
                .last_saved
                .is_some_and(|at| at.elapsed() < CONTENT_PERSIST_INTERVAL);
            if recent {
                clock.dirty = true;
                return;
            }
        }
        self.persist(state).await;
    }

    /// Applies `f` to one session under the write lock. Returns `None`, and
    /// changes nothing, when the session does not exist.
    async fn mutate_session<R>(
        &self,
        session_id: &SessionId,
        f: impl FnOnce(&mut ChatSession) -> Option<R> + Send,
    ) -> Option<R> {
        let mut state = self.state.write().await;
        let session = state.chats.iter_mut().find(|c| &c.id == session_id)?;
        let result = f(session)?;
        session.touch();
        self.persist(&state).await;
        Some(result)
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create_session(&self) -> SessionId {
        let session = ChatSession::new();
        let id = session.id.clone();
        let mut state = self.state.write().await;
        state.chats.insert(0, session);
        state.current_chat_id = Some(id.clone());
        self.persist(&state).await;
        debug!(session_id = %id, "session created");
        id
    }

    async fn delete_session(&self, id: &SessionId) -> bool {
        let mut state = self.state.write().await;
        let before = state.chats.len();
        state.chats.retain(|c| &c.id != id);
        let removed = state.chats.len() != before;
        let was_current = state.current_chat_id.as_ref() == Some(id);
        if was_current {
            state.current_chat_id = None;
        }
        if removed || was_current {
            self.persist(&state).await;
        }
        if removed {
            debug!(session_id = %id, "session deleted");
        }
        removed
    }

    async fn select_session(&self, id: &SessionId) {
        let mut state = self.state.write().await;
        state.current_chat_id = Some(id.clone());
        self.persist(&state).await;
    }

    async fn append_message(
        &self,
        session_id: &SessionId,
        role: Role,
        content: &str,
    ) -> Option<MessageId> {
        let message = Message::new(role, content);
        let id = message.id.clone();
        self.mutate_session(session_id, move |session| {
            session.messages.push(message);
            Some(())
        })
        .await?;
        Some(id)
    }

    async fn replace_last_message_content(&self, session_id: &SessionId, content: &str) -> bool {
        self.mutate_session(session_id, |session| {
            let last = session.messages.last_mut()?;
            last.content = content.to_string();
            Some(())
        })
        .await
        .is_some()
    }

    async fn replace_message_content(
        &self,
        session_id: &SessionId,
        message_id: &MessageId,
        content: &str,
    ) -> bool {
        let mut state = self.state.write().await;
        let Some(session) = state.chats.iter_mut().find(|c| &c.id == session_id) else {
            return false;
        };
        let Some(message) = session.messages.iter_mut().find(|m| &m.id == message_id) else {
            return false;
        };
        message.content = content.to_string();
        session.touch();
        self.persist_throttled(&state).await;
        true
    }

    async fn remove_message(&self, session_id: &SessionId, message_id: &MessageId) -> bool {
        self.mutate_session(session_id, |session| {
            let index = session.messages.iter().position(|m| &m.id == message_id)?;
            session.messages.remove(index);
            Some(())
        })
        .await
        .is_some()
    }

    async fn update_title(&self, session_id: &SessionId, title: &str) -> bool {
        self.mutate_session(session_id, |session| {
            session.title = title.to_string();
            Some(())
        })
        .await
        .is_some()
    }

    async fn session(&self, id: &SessionId) -> Option<ChatSession> {
        self.state
            .read()
            .await
            .chats
            .iter()
            .find(|c| &c.id == id)
            .cloned()
    }

    async fn sessions(&self) -> Vec<ChatSession> {
        self.state.read().await.chats.clone()
    }

    async fn current_session_id(&self) -> Option<SessionId> {
        self.state.read().await.current_chat_id.clone()
    }

    async fn flush(&self) {
        let state = self.state.write().await;
        let dirty = self.clock.lock().await.dirty;
        if dirty {
            self.persist(&state).await;
        }
    }
}
