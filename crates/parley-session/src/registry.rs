// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One live generation per chat session.
//!
//! The registry hands out a [`GenerationGuard`] per chat. The guard owns the
//! cancellation token for that generation and frees the slot when dropped,
//! so a finished (or panicked) generation never leaves its chat locked.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parley_core::{ParleyError, SessionId};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct GenerationRegistry {
    active: Arc<DashMap<SessionId, CancellationToken>>,
}

impl GenerationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the generation slot for `session_id`.
    ///
    /// Fails with [`ParleyError::SessionBusy`] while another generation for
    /// the same chat is alive.
    pub fn acquire(&self, session_id: &SessionId) -> Result<GenerationGuard, ParleyError> {
        match self.active.entry(session_id.clone()) {
            Entry::Occupied(_) => Err(ParleyError::SessionBusy {
                session_id: session_id.clone(),
            }),
            Entry::Vacant(slot) => {
                let token = CancellationToken::new();
                slot.insert(token.clone());
                debug!(session_id = %session_id, "generation slot acquired");
                Ok(GenerationGuard {
                    active: Arc::clone(&self.active),
                    session_id: session_id.clone(),
                    token,
                })
            }
        }
    }

    /// Signals the generation running for `session_id`, if any.
    pub fn cancel(&self, session_id: &SessionId) -> bool {
        match self.active.get(session_id) {
            Some(token) => {
                token.cancel();
                debug!(session_id = %session_id, "generation cancel requested");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, session_id: &SessionId) -> bool {
        self.active.contains_key(session_id)
    }
}

/// Exclusive claim on a chat's generation slot.
#[derive(Debug)]
pub struct GenerationGuard {
    active: Arc<DashMap<SessionId, CancellationToken>>,
    session_id: SessionId,
    token: CancellationToken,
}

impl GenerationGuard {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.active.remove(&self.session_id);
        debug!(session_id = %self.session_id, "generation slot released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_for_same_chat_is_busy() {
        let registry = GenerationRegistry::new();
        let id = SessionId::new();
        let _guard = registry.acquire(&id).unwrap();

        let err = registry.acquire(&id).unwrap_err();
        assert!(matches!(err, ParleyError::SessionBusy { session_id } if session_id == id));

        let other = SessionId::new();
        assert!(registry.acquire(&other).is_ok());
    }

    #[test]
    fn dropping_guard_frees_slot() {
        let registry = GenerationRegistry::new();
        let id = SessionId::new();
        let guard = registry.acquire(&id).unwrap();
        assert!(registry.is_active(&id));
        drop(guard);
        assert!(!registry.is_active(&id));
        assert!(registry.acquire(&id).is_ok());
    }

    #[test]
    fn cancel_reaches_guard_token() {
        let registry = GenerationRegistry::new();
        let id = SessionId::new();
        let guard = registry.acquire(&id).unwrap();

        assert!(!registry.cancel(&SessionId::new()));
        assert!(registry.cancel(&id));
        assert!(guard.token().is_cancelled());
    }

    #[test]
    fn cancel_only_touches_its_own_chat() {
        let registry = GenerationRegistry::new();
        let a = registry.acquire(&SessionId::new()).unwrap();
        let b = registry.acquire(&SessionId::new()).unwrap();
        assert!(registry.cancel(a.session_id()));
        assert!(a.token().is_cancelled());
        assert!(!b.token().is_cancelled());
        assert!(registry.is_active(a.session_id()));
    }
}
