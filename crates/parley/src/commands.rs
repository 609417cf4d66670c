// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `models`, `search`, `sessions`, `config`.

use chrono::{Local, TimeZone};
use colored::Colorize;
use parley_config::ParleyConfig;
use parley_context::format_context_size;
use parley_core::{ChatSession, ConversationStore, ParleyError, SearchProvider};
use parley_search::WebSearch;

use crate::app::App;

pub async fn run_models(config: ParleyConfig, ephemeral: bool) -> Result<(), ParleyError> {
    let app = App::open(config, ephemeral).await?;
    let models = app.client.list_models().await?;
    if models.is_empty() {
        println!("No models installed. Pull one with `ollama pull <name>`.");
        return Ok(());
    }

    let selected = app.settings.selected_model().await;
    for model in &models {
        app.refresh_model_info(&model.name).await;
        let info = app.settings.model_info(&model.name).await;
        let marker = if selected.as_deref() == Some(model.name.as_str()) {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        let family = info
            .as_ref()
            .and_then(|i| i.family.clone())
            .unwrap_or_else(|| "-".into());
        let params = info
            .as_ref()
            .and_then(|i| i.parameter_size.clone())
            .unwrap_or_else(|| "-".into());
        let context = app.settings.context_length(&model.name).await;
        println!(
            "{marker} {} {:<10} {:>8}  {}",
            format!("{:<32}", model.name).bold(),
            family,
            params,
            format_context_size(u64::from(context)).dimmed()
        );
    }
    app.close().await;
    Ok(())
}

pub async fn run_search(config: &ParleyConfig, query: &str) -> Result<(), ParleyError> {
    if !config.search.enabled {
        return Err(ParleyError::InvalidRequest(
            "web search is disabled in configuration".into(),
        ));
    }
    let search = WebSearch::from_config(&config.search)?;
    let outcome = search.search(query).await?;
    println!("{}", outcome.summary);
    Ok(())
}

pub async fn run_sessions(config: ParleyConfig, ephemeral: bool) -> Result<(), ParleyError> {
    let app = App::open(config, ephemeral).await?;
    let sessions = app.store.sessions().await;
    if sessions.is_empty() {
        println!("No saved chats.");
        return Ok(());
    }
    let current = app.store.current_session_id().await;
    for (i, session) in sessions.iter().enumerate() {
        println!(
            "{}",
            session_line(i + 1, session, current.as_ref() == Some(&session.id))
        );
    }
    app.close().await;
    Ok(())
}

pub fn run_config(config: &ParleyConfig) -> Result<(), ParleyError> {
    let rendered = config
        .to_toml_string()
        .map_err(|e| ParleyError::Config(format!("failed to render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// `"<n>. <title> (<count> messages, <updated>)"`, starred when current.
pub fn session_line(index: usize, session: &ChatSession, current: bool) -> String {
    let updated = Local
        .timestamp_millis_opt(session.updated_at)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into());
    let marker = if current { "*" } else { " " };
    let count = session.messages.len();
    let noun = if count == 1 { "message" } else { "messages" };
    format!(
        "{marker} {index:>2}. {} ({count} {noun}, {updated})",
        session.title
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{Message, Role};

    #[test]
    fn session_line_shows_count_and_marker() {
        let mut session = ChatSession::new();
        session.title = "Rust questions".into();
        session.messages.push(Message::new(Role::User, "hi"));

        let line = session_line(3, &session, true);
        assert!(line.starts_with("*  3. Rust questions (1 message, "));

        session.messages.push(Message::new(Role::Assistant, "hello"));
        let line = session_line(3, &session, false);
        assert!(line.starts_with("   3. Rust questions (2 messages, "));
    }

    #[test]
    fn config_renders() {
        let config = parley_config::load_and_validate_str("[ollama]\ncontext_size = 8192\n").unwrap();
        assert!(run_config(&config).is_ok());
    }
}
