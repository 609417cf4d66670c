// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./parley.toml` > `~/.config/parley/parley.toml` >
//! `/etc/parley/parley.toml`, with `PARLEY_*` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ParleyConfig;

/// Sections that environment variables may address.
const ENV_SECTIONS: &[&str] = &["app", "ollama", "storage", "search"];

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/parley/parley.toml";
pub(crate) const LOCAL_CONFIG_PATH: &str = "parley.toml";

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("parley").join("parley.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/parley/parley.toml`
/// 3. `~/.config/parley/parley.toml`
/// 4. `./parley.toml`
/// 5. `PARLEY_*` environment variables
pub fn load_config() -> Result<ParleyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no env vars.
pub fn load_config_from_str(toml_content: &str) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file plus env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Maps `PARLEY_OLLAMA_ENDPOINT` to `ollama.endpoint`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `PARLEY_OLLAMA_CONNECT_TIMEOUT_SECS` lands on `ollama.connect_timeout_secs`.
fn env_provider() -> Env {
    Env::prefixed("PARLEY_").map(|key| env_key_to_path(key.as_str()).into())
}

pub(crate) fn env_key_to_path(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_section_paths() {
        assert_eq!(env_key_to_path("ollama_endpoint"), "ollama.endpoint");
        assert_eq!(
            env_key_to_path("ollama_connect_timeout_secs"),
            "ollama.connect_timeout_secs"
        );
        assert_eq!(env_key_to_path("search_max_results"), "search.max_results");
        assert_eq!(env_key_to_path("app_log_level"), "app.log_level");
        assert_eq!(env_key_to_path("storage_database_path"), "storage.database_path");
    }

    #[test]
    fn unknown_sections_pass_through() {
        assert_eq!(env_key_to_path("appetite"), "appetite");
        assert_eq!(env_key_to_path("bogus_key"), "bogus_key");
    }

    #[test]
    fn env_override_is_applied() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PARLEY_OLLAMA_ENDPOINT", "http://gpu-box:11434");
            jail.set_env("PARLEY_SEARCH_MAX_RESULTS", "3");
            let config: ParleyConfig = Figment::new()
                .merge(Serialized::defaults(ParleyConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.ollama.endpoint, "http://gpu-box:11434");
            assert_eq!(config.search.max_results, 3);
            Ok(())
        });
    }
}
