// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration, collecting every problem found.
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "app.log_level `{}` must be one of: {}",
            config.app.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    check_http_url(&mut errors, "ollama.endpoint", &config.ollama.endpoint);

    if let Some(model) = &config.ollama.default_model
        && model.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "ollama.default_model must not be empty when set",
        ));
    }

    if config.ollama.context_size == 0 {
        errors.push(ConfigError::validation(
            "ollama.context_size must be positive",
        ));
    }

    if config.ollama.connect_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "ollama.connect_timeout_secs must be positive",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.search.enabled {
        check_http_url(&mut errors, "search.duckduckgo_url", &config.search.duckduckgo_url);
        check_http_url(&mut errors, "search.wikipedia_url", &config.search.wikipedia_url);
    }

    if config.search.max_results < 1 {
        errors.push(ConfigError::validation(
            "search.max_results must be at least 1",
        ));
    }

    if config.search.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "search.timeout_secs must be positive",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(errors: &mut Vec<ConfigError>, key: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(ConfigError::validation(format!("{key} must not be empty")));
    } else if !(value.starts_with("http://") || value.starts_with("https://")) {
        errors.push(ConfigError::validation(format!(
            "{key} `{value}` must start with http:// or https://"
        )));
    }
}
