// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value state persistence backends.

use std::collections::HashMap;

use async_trait::async_trait;
use parley_core::{AdapterType, HealthStatus, ParleyError, PluginAdapter, StatePersistence};
use rusqlite::{OptionalExtension, params};
use tokio::sync::Mutex;
use tracing::debug;

use crate::database::{Database, map_tr_err};

/// Key holding the serialized conversation store.
pub const CHAT_STORE_KEY: &str = "chat-store";

/// Key holding the serialized model settings.
pub const MODEL_STORE_KEY: &str = "model-store";

/// Persists blobs in the `kv_store` table.
pub struct SqlitePersistence {
    db: Database,
}

impl SqlitePersistence {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens the database at `path` and wraps it.
    pub async fn open(path: &str) -> Result<Self, ParleyError> {
        Ok(Self::new(Database::open(path).await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl PluginAdapter for SqlitePersistence {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Persistence
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl StatePersistence for SqlitePersistence {
    async fn load(&self, key: &str) -> Result<Option<String>, ParleyError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), ParleyError> {
        let key = key.to_string();
        let value = value.to_string();
        let updated_at = chrono::Utc::now().to_rfc3339();
        let len = value.len();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                    updated_at = excluded.updated_at",
                    params![key, value, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(bytes = len, "state saved");
        Ok(())
    }
}

/// Volatile persistence for tests and `--ephemeral` runs.
#[derive(Default)]
pub struct MemoryPersistence {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginAdapter for MemoryPersistence {
    fn name(&self) -> &str {
        "memory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Persistence
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl StatePersistence for MemoryPersistence {
    async fn load(&self, key: &str) -> Result<Option<String>, ParleyError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), ParleyError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (SqlitePersistence, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kv.db");
        let store = SqlitePersistence::open(path.to_str().unwrap()).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn missing_key_loads_none() {
        let (store, _dir) = setup().await;
        assert!(store.load(CHAT_STORE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_overwrite() {
        let (store, _dir) = setup().await;
        store.save(MODEL_STORE_KEY, r#"{"a":1}"#).await.unwrap();
        store.save(MODEL_STORE_KEY, r#"{"a":2}"#).await.unwrap();
        assert_eq!(
            store.load(MODEL_STORE_KEY).await.unwrap().as_deref(),
            Some(r#"{"a":2}"#)
        );
        assert!(store.load(CHAT_STORE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        {
            let store = SqlitePersistence::open(path.to_str().unwrap()).await.unwrap();
            store.save(CHAT_STORE_KEY, "[]").await.unwrap();
            store.database().checkpoint().await.unwrap();
        }
        let store = SqlitePersistence::open(path.to_str().unwrap()).await.unwrap();
        assert_eq!(store.load(CHAT_STORE_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let (store, _dir) = setup().await;
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(store.adapter_type(), AdapterType::Persistence);
    }

    #[tokio::test]
    async fn memory_persistence_round_trip() {
        let store = MemoryPersistence::new();
        assert!(store.load("k").await.unwrap().is_none());
        store.save("k", "v").await.unwrap();
        assert_eq!(store.load("k").await.unwrap().as_deref(), Some("v"));
    }
}
