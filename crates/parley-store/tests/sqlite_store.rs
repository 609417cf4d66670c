// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation and settings state surviving a restart on SQLite.

use std::sync::Arc;

use parley_core::{ConversationStore, ModelSettings, Role, StatePersistence};
use parley_store::{MemoryConversationStore, SettingsStore, SqlitePersistence};
use tempfile::tempdir;

#[tokio::test]
async fn chats_and_settings_survive_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parley.db");
    let path = path.to_str().unwrap();

    let session_id = {
        let persistence: Arc<dyn StatePersistence> =
            Arc::new(SqlitePersistence::open(path).await.unwrap());
        let chats = MemoryConversationStore::load(persistence.clone()).await.unwrap();
        let settings = SettingsStore::load(persistence, ModelSettings::default())
            .await
            .unwrap();

        let id = chats.create_session().await;
        chats.append_message(&id, Role::User, "What is Rust?").await.unwrap();
        let reply = chats.append_message(&id, Role::Assistant, "").await.unwrap();
        chats
            .replace_message_content(&id, &reply, "A systems language.")
            .await;
        chats.update_title(&id, "Rust").await;
        settings.set_selected_model("llama3:8b").await.unwrap();
        id
    };

    let persistence: Arc<dyn StatePersistence> =
        Arc::new(SqlitePersistence::open(path).await.unwrap());
    let chats = MemoryConversationStore::load(persistence.clone()).await.unwrap();
    let settings = SettingsStore::load(persistence, ModelSettings::default())
        .await
        .unwrap();

    let session = chats.current_session().await.expect("current session restored");
    assert_eq!(session.id, session_id);
    assert_eq!(session.title, "Rust");
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[1].content, "A systems language.");
    assert_eq!(settings.selected_model().await.as_deref(), Some("llama3:8b"));
}
