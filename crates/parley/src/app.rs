// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup wiring shared by the subcommands.

use std::sync::Arc;

use parley_config::ParleyConfig;
use parley_core::{ConversationStore, ModelSettings, ParleyError, StatePersistence};
use parley_ollama::OllamaClient;
use parley_search::WebSearch;
use parley_session::ChatController;
use parley_store::{
    Database, MemoryConversationStore, MemoryPersistence, SettingsStore, SqlitePersistence,
};
use tracing::{debug, info, warn};

/// Everything a command needs, opened from configuration.
pub struct App {
    pub config: ParleyConfig,
    pub store: Arc<MemoryConversationStore>,
    pub settings: Arc<SettingsStore>,
    pub client: OllamaClient,
    database: Option<Database>,
}

impl App {
    /// Opens persistence (SQLite, or memory when `ephemeral`), restores
    /// chats and settings, and builds the Ollama client.
    ///
    /// The configured endpoint always wins over a persisted one.
    pub async fn open(config: ParleyConfig, ephemeral: bool) -> Result<Self, ParleyError> {
        let (persistence, database): (Arc<dyn StatePersistence>, Option<Database>) = if ephemeral
        {
            info!("ephemeral run, nothing will be saved");
            (Arc::new(MemoryPersistence::new()), None)
        } else {
            let sqlite = SqlitePersistence::open(&config.storage.database_path).await?;
            let database = sqlite.database().clone();
            info!(path = %config.storage.database_path, "state database opened");
            (Arc::new(sqlite), Some(database))
        };

        let store = Arc::new(MemoryConversationStore::load(Arc::clone(&persistence)).await?);

        let defaults = ModelSettings {
            selected_model: config.ollama.default_model.clone(),
            ollama_endpoint: config.ollama.endpoint.clone(),
            selected_context_size: config.ollama.context_size,
            ..ModelSettings::default()
        };
        let settings = Arc::new(SettingsStore::load(persistence, defaults).await?);
        if settings.ollama_endpoint().await != config.ollama.endpoint {
            settings.set_ollama_endpoint(&config.ollama.endpoint).await?;
        }
        if settings.selected_model().await.is_none() {
            if let Some(model) = &config.ollama.default_model {
                settings.set_selected_model(model).await?;
            }
        }

        let client = OllamaClient::from_config(&config.ollama)?;
        debug!(endpoint = %client.endpoint(), "ollama client ready");

        Ok(Self {
            config,
            store,
            settings,
            client,
            database,
        })
    }

    /// A controller over this app's store, settings and client, with web
    /// search when enabled.
    pub fn controller(&self) -> Result<ChatController, ParleyError> {
        let controller = ChatController::new(
            self.store.clone(),
            Arc::clone(&self.settings),
            Arc::new(self.client.clone()),
        );
        if !self.config.search.enabled {
            return Ok(controller);
        }
        let search = WebSearch::from_config(&self.config.search)?;
        Ok(controller.with_search(Arc::new(search)))
    }

    /// Fetches and caches details for `model`. Failure is logged and
    /// leaves the cache untouched.
    pub async fn refresh_model_info(&self, model: &str) {
        match self.client.show_model(model).await {
            Ok(info) => {
                if let Err(e) = self.settings.set_model_info(info).await {
                    warn!(model, error = %e, "failed to save model info");
                }
            }
            Err(e) => warn!(model, error = %e, "failed to fetch model details"),
        }
    }

    /// Writes deferred chat state and flushes the WAL before exit.
    pub async fn close(&self) {
        self.store.flush().await;
        if let Some(database) = &self.database {
            if let Err(e) = database.checkpoint().await {
                warn!(error = %e, "WAL checkpoint failed");
            }
        }
    }
}
