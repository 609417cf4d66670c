// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State storage for Parley.
//!
//! Chats and model settings are kept in memory and written through, as JSON
//! blobs under fixed keys, to a [`StatePersistence`](parley_core::StatePersistence)
//! backend. The SQLite backend runs on a single `tokio-rusqlite` connection
//! with embedded refinery migrations.

pub mod database;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod settings;

pub use database::Database;
pub use kv::{CHAT_STORE_KEY, MODEL_STORE_KEY, MemoryPersistence, SqlitePersistence};
pub use memory::{CONTENT_PERSIST_INTERVAL, ChatSnapshot, MemoryConversationStore};
pub use settings::SettingsStore;
