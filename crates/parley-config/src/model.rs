// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently ignored.

use parley_core::types::{DEFAULT_CONTEXT_SIZE, DEFAULT_OLLAMA_ENDPOINT};
use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Application-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Ollama endpoint settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Where chats and settings are persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Web search settings.
    #[serde(default)]
    pub search: SearchConfig,
}

impl ParleyConfig {
    /// Renders the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Ollama endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model used when none has been selected yet.
    #[serde(default)]
    pub default_model: Option<String>,

    /// Context window requested when the user has not picked one.
    #[serde(default = "default_context_size")]
    pub context_size: u32,

    /// Time allowed to establish a connection. Streaming responses are not
    /// bounded; the user stops them.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            default_model: None,
            context_size: default_context_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_OLLAMA_ENDPOINT.to_string()
}

fn default_context_size() -> u32 {
    DEFAULT_CONTEXT_SIZE
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("parley").join("parley.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("parley.db"))
        .to_string_lossy()
        .into_owned()
}

/// Web search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Disables `/search` entirely when false.
    #[serde(default = "default_search_enabled")]
    pub enabled: bool,

    /// DuckDuckGo instant answer API base URL.
    #[serde(default = "default_duckduckgo_url")]
    pub duckduckgo_url: String,

    /// Wikipedia API base URL.
    #[serde(default = "default_wikipedia_url")]
    pub wikipedia_url: String,

    /// Upper bound on merged results.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: default_search_enabled(),
            duckduckgo_url: default_duckduckgo_url(),
            wikipedia_url: default_wikipedia_url(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

fn default_search_enabled() -> bool {
    true
}

fn default_duckduckgo_url() -> String {
    "https://api.duckduckgo.com".to_string()
}

fn default_wikipedia_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_search_timeout_secs() -> u64 {
    20
}
