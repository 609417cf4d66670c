// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answering a question from a web search.
//!
//! The chat shows the query as a user message and a status line while the
//! search runs. Without usable results a fixed reply is posted. Otherwise
//! the summary is handed to the model, and the "analyzing" status is
//! replaced by the streamed answer.

use std::sync::Arc;

use parley_core::{MessageId, ParleyError, Role, SearchOutcome, SessionId};
use parley_search::summary::no_results_message;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::controller::{ChatController, unknown_session};
use crate::generation::{GenerationReport, GenerationSession};

pub const SEARCH_MESSAGE_PREFIX: &str = "🔍 Search: ";
pub const SEARCHING_STATUS: &str = "Searching the web for information...";
pub const ANALYZING_STATUS: &str = "Analyzing search results...";

/// The prompt asking the model to answer from `summary`.
pub fn search_prompt(query: &str, summary: &str) -> String {
    format!(
        "I searched for \"{query}\" and found these results:\n\n{summary}\n\n\
         Based on these search results, please provide a comprehensive answer to my query: \"{query}\""
    )
}

/// How a search turn ended.
#[derive(Debug)]
pub enum SearchAnswer {
    /// Nothing usable was found; the fixed reply was posted.
    NoResults { message_id: Option<MessageId> },
    /// Stopped while the search itself was still running.
    Cancelled,
    /// The model answered (or tried to) from the results.
    Answered {
        outcome: SearchOutcome,
        report: GenerationReport,
    },
}

impl ChatController {
    /// Searches the web for `query` and streams a model answer built from
    /// the results into the chat.
    pub async fn search_and_answer(
        &self,
        session_id: &SessionId,
        query: &str,
        observer: Option<mpsc::UnboundedSender<String>>,
    ) -> Result<SearchAnswer, ParleyError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ParleyError::InvalidRequest("search query is empty".into()));
        }
        let Some(search) = self.search.clone() else {
            return Err(ParleyError::InvalidRequest("web search is disabled".into()));
        };
        let model = self.require_model().await?;

        let guard = self.registry.acquire(session_id)?;
        self.store
            .append_message(session_id, Role::User, &format!("{SEARCH_MESSAGE_PREFIX}{query}"))
            .await
            .ok_or_else(|| unknown_session(session_id))?;
        let status = self
            .store
            .append_message(session_id, Role::Assistant, SEARCHING_STATUS)
            .await;

        let cancel = guard.token().clone();
        let searched = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = search.search(query) => Some(result),
        };
        if let Some(id) = &status {
            self.store.remove_message(session_id, id).await;
        }

        let outcome = match searched {
            None => {
                info!(session_id = %session_id, "search cancelled");
                return Ok(SearchAnswer::Cancelled);
            }
            Some(Ok(outcome)) => outcome,
            Some(Err(e)) => {
                warn!(session_id = %session_id, error = %e, "web search failed");
                SearchOutcome {
                    results: Vec::new(),
                    summary: String::new(),
                }
            }
        };

        if !outcome.has_results() {
            let message_id = self
                .store
                .append_message(session_id, Role::Assistant, &no_results_message(query))
                .await;
            info!(session_id = %session_id, query = %query, "search found nothing");
            return Ok(SearchAnswer::NoResults { message_id });
        }

        let request = self
            .request(model, search_prompt(query, &outcome.summary))
            .await;
        let mut generation =
            GenerationSession::new(Arc::clone(&self.store), Arc::clone(&self.backend), guard);
        if let Some(id) = self
            .store
            .append_message(session_id, Role::Assistant, ANALYZING_STATUS)
            .await
        {
            generation = generation.with_transient_status(id);
        }
        if let Some(observer) = observer {
            generation = generation.with_observer(observer);
        }

        let report = generation.run(request).await?;
        Ok(SearchAnswer::Answered { outcome, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_wraps_summary() {
        assert_eq!(
            search_prompt("tokio", "SUMMARY"),
            "I searched for \"tokio\" and found these results:\n\nSUMMARY\n\n\
             Based on these search results, please provide a comprehensive answer to my query: \"tokio\""
        );
    }
}
