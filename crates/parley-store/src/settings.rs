// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model selection and context-size preferences.

use std::sync::Arc;

use parley_context::available_context_sizes;
use parley_core::{DEFAULT_CONTEXT_SIZE, ModelInfo, ModelSettings, ParleyError, StatePersistence};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::kv::MODEL_STORE_KEY;

/// Holds [`ModelSettings`] and writes every change through to persistence.
pub struct SettingsStore {
    settings: RwLock<ModelSettings>,
    persistence: Option<Arc<dyn StatePersistence>>,
}

impl SettingsStore {
    /// Settings that live only as long as the process.
    pub fn new(initial: ModelSettings) -> Self {
        Self {
            settings: RwLock::new(initial),
            persistence: None,
        }
    }

    /// Restores persisted settings, falling back to `defaults` when nothing
    /// (or nothing readable) was stored.
    pub async fn load(
        persistence: Arc<dyn StatePersistence>,
        defaults: ModelSettings,
    ) -> Result<Self, ParleyError> {
        let settings = match persistence.load(MODEL_STORE_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unreadable model settings");
                defaults
            }),
            None => defaults,
        };
        Ok(Self {
            settings: RwLock::new(settings),
            persistence: Some(persistence),
        })
    }

    pub async fn snapshot(&self) -> ModelSettings {
        self.settings.read().await.clone()
    }

    pub async fn selected_model(&self) -> Option<String> {
        self.settings.read().await.selected_model.clone()
    }

    pub async fn set_selected_model(&self, model: &str) -> Result<(), ParleyError> {
        self.update(|s| s.selected_model = Some(model.to_string()))
            .await
    }

    pub async fn ollama_endpoint(&self) -> String {
        self.settings.read().await.ollama_endpoint.clone()
    }

    pub async fn set_ollama_endpoint(&self, endpoint: &str) -> Result<(), ParleyError> {
        self.update(|s| s.ollama_endpoint = endpoint.to_string())
            .await
    }

    pub async fn model_info(&self, model: &str) -> Option<ModelInfo> {
        self.settings.read().await.models_info.get(model).cloned()
    }

    pub async fn set_model_info(&self, info: ModelInfo) -> Result<(), ParleyError> {
        self.update(|s| {
            s.models_info.insert(info.name.clone(), info);
        })
        .await
    }

    /// The model's context length, or 4096 when the model is unknown.
    pub async fn context_length(&self, model: &str) -> u32 {
        self.settings
            .read()
            .await
            .models_info
            .get(model)
            .map(|info| info.context_length)
            .filter(|len| *len > 0)
            .unwrap_or(DEFAULT_CONTEXT_SIZE)
    }

    pub async fn context_size(&self) -> u32 {
        self.settings.read().await.selected_context_size
    }

    pub async fn set_context_size(&self, size: u32) -> Result<(), ParleyError> {
        if size == 0 {
            return Err(ParleyError::InvalidRequest(
                "context size must be positive".into(),
            ));
        }
        self.update(|s| s.selected_context_size = size).await
    }

    /// Context sizes the user may select for `model`.
    pub async fn available_context_sizes(&self, model: &str) -> Vec<u32> {
        available_context_sizes(self.context_length(model).await)
    }

    async fn update(&self, f: impl FnOnce(&mut ModelSettings) + Send) -> Result<(), ParleyError> {
        let mut settings = self.settings.write().await;
        f(&mut settings);
        if let Some(persistence) = &self.persistence {
            let raw = serde_json::to_string(&*settings).map_err(|e| ParleyError::Storage {
                source: Box::new(e),
            })?;
            persistence.save(MODEL_STORE_KEY, &raw).await?;
        }
        debug!(
            model = settings.selected_model.as_deref().unwrap_or("-"),
            context_size = settings.selected_context_size,
            "model settings updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryPersistence;

    fn info(name: &str, context_length: u32) -> ModelInfo {
        ModelInfo {
            name: name.into(),
            family: Some("llama".into()),
            parameter_size: Some("8B".into()),
            context_length,
        }
    }

    #[tokio::test]
    async fn unknown_model_gets_default_context() {
        let store = SettingsStore::new(ModelSettings::default());
        assert_eq!(store.context_length("mystery").await, 4096);
        assert_eq!(store.available_context_sizes("mystery").await, vec![4096]);
    }

    #[tokio::test]
    async fn known_model_limits_sizes() {
        let store = SettingsStore::new(ModelSettings::default());
        store.set_model_info(info("llama3:8b", 16384)).await.unwrap();
        assert_eq!(store.context_length("llama3:8b").await, 16384);
        assert_eq!(
            store.available_context_sizes("llama3:8b").await,
            vec![4096, 8192, 16384]
        );
    }

    #[tokio::test]
    async fn zero_context_size_is_rejected() {
        let store = SettingsStore::new(ModelSettings::default());
        assert!(store.set_context_size(0).await.is_err());
        store.set_context_size(8192).await.unwrap();
        assert_eq!(store.context_size().await, 8192);
    }

    #[tokio::test]
    async fn settings_persist_across_loads() {
        let persistence: Arc<dyn StatePersistence> = Arc::new(MemoryPersistence::new());
        let store = SettingsStore::load(persistence.clone(), ModelSettings::default())
            .await
            .unwrap();
        store.set_selected_model("mistral:7b").await.unwrap();
        store.set_ollama_endpoint("http://gpu:11434").await.unwrap();

        let reloaded = SettingsStore::load(persistence, ModelSettings::default())
            .await
            .unwrap();
        assert_eq!(reloaded.selected_model().await.as_deref(), Some("mistral:7b"));
        assert_eq!(reloaded.ollama_endpoint().await, "http://gpu:11434");
    }

    #[tokio::test]
    async fn stored_json_uses_camel_case() {
        let persistence = Arc::new(MemoryPersistence::new());
        let store = SettingsStore::load(persistence.clone(), ModelSettings::default())
            .await
            .unwrap();
        store.set_context_size(32768).await.unwrap();
        let raw = persistence.load(MODEL_STORE_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"selectedContextSize\":32768"));
    }
}
