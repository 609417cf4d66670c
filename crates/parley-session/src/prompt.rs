// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning user input plus attachments into a chat message and a prompt.

use std::path::PathBuf;

use parley_context::estimate_file_tokens;
use parley_core::{ContentExtractor, ParleyError, is_extraction_error};

use crate::extract::file_name;

/// What a send produces before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMessage {
    /// Stored as the user message.
    pub display: String,
    /// Sent to the model.
    pub prompt: String,
}

/// The user-visible message: input, then one `File:` line per attachment.
pub fn display_content(input: &str, attachments: &[PathBuf]) -> String {
    if attachments.is_empty() {
        return input.to_string();
    }
    let files: Vec<String> = attachments
        .iter()
        .map(|p| format!("File: {}", p.display()))
        .collect();
    format!("{input}\n\nAttached files:\n{}", files.join("\n"))
}

/// One attachment as it appears in the prompt.
pub fn file_block(name: &str, content: &str) -> String {
    if is_extraction_error(content) {
        format!("File: {name}\n{content}")
    } else {
        format!("### File: {name} ###\nContent:\n{content}\n### End of {name} ###")
    }
}

/// Extracts every attachment and builds both texts.
///
/// Input is trimmed. Empty input is fine as long as something is attached.
pub async fn prepare_message(
    input: &str,
    attachments: &[PathBuf],
    extractor: &dyn ContentExtractor,
) -> Result<PreparedMessage, ParleyError> {
    let input = input.trim();
    if input.is_empty() && attachments.is_empty() {
        return Err(ParleyError::InvalidRequest(
            "message is empty and nothing is attached".into(),
        ));
    }

    let display = display_content(input, attachments);
    if attachments.is_empty() {
        return Ok(PreparedMessage {
            display,
            prompt: input.to_string(),
        });
    }

    let mut blocks = Vec::with_capacity(attachments.len());
    for path in attachments {
        let content = extractor.extract(path).await;
        blocks.push(file_block(&file_name(path), &content));
    }
    let prompt = format!(
        "{input}\n\nProcessed file contents:\n\n{}",
        blocks.join("\n\n")
    );
    Ok(PreparedMessage { display, prompt })
}

/// Rough token cost of pending attachments, from their size on disk.
pub fn attachment_tokens(attachments: &[PathBuf]) -> u64 {
    attachments
        .iter()
        .map(|path| {
            let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            estimate_file_tokens(&file_name(path), guess_mime(path), size)
        })
        .sum()
}

fn guess_mime(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .as_deref()
    {
        Some("txt" | "md" | "log" | "rs" | "toml" | "yaml" | "yml") => "text/plain",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("html") => "text/html",
        Some("pdf") => "application/pdf",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PlainTextExtractor;

    #[test]
    fn display_lists_attachments() {
        let files = vec![PathBuf::from("docs/a.txt"), PathBuf::from("b.md")];
        assert_eq!(
            display_content("look", &files),
            "look\n\nAttached files:\nFile: docs/a.txt\nFile: b.md"
        );
        assert_eq!(display_content("plain", &[]), "plain");
    }

    #[test]
    fn blocks_differ_for_errors() {
        assert_eq!(
            file_block("a.txt", "hi"),
            "### File: a.txt ###\nContent:\nhi\n### End of a.txt ###"
        );
        assert_eq!(
            file_block("a.pdf", "Error: Unsupported file type: pdf"),
            "File: a.pdf\nError: Unsupported file type: pdf"
        );
    }

    #[tokio::test]
    async fn prompt_folds_in_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("a.txt");
        std::fs::write(&text, "alpha").unwrap();
        let pdf = dir.path().join("b.pdf");
        std::fs::write(&pdf, "%PDF").unwrap();

        let prepared = prepare_message("  summarize  ", &[text, pdf], &PlainTextExtractor)
            .await
            .unwrap();

        assert!(prepared.display.starts_with("summarize\n\nAttached files:\nFile: "));
        assert_eq!(
            prepared.prompt,
            "summarize\n\nProcessed file contents:\n\n\
             ### File: a.txt ###\nContent:\nalpha\n### End of a.txt ###\n\n\
             File: b.pdf\nError: Unsupported file type: pdf"
        );
    }

    #[tokio::test]
    async fn attachments_alone_are_enough() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("a.txt");
        std::fs::write(&text, "alpha").unwrap();

        let prepared = prepare_message("", &[text], &PlainTextExtractor).await.unwrap();
        assert!(prepared.prompt.starts_with("\n\nProcessed file contents:"));
    }

    #[tokio::test]
    async fn empty_input_without_attachments_is_rejected() {
        let err = prepare_message("   ", &[], &PlainTextExtractor)
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::InvalidRequest(_)));
    }

    #[test]
    fn attachment_tokens_use_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, vec![b'x'; 2048]).unwrap();
        assert_eq!(attachment_tokens(&[path]), 400);
        assert_eq!(attachment_tokens(&[dir.path().join("missing.csv")]), 0);
    }
}
