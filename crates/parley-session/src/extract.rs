// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text extraction for attached files.

use std::path::Path;

use async_trait::async_trait;
use parley_core::ContentExtractor;
use tracing::{debug, warn};

/// Extensions read as (lossy) UTF-8 text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "csv", "json", "log", "rs", "toml", "yaml", "yml", "xml", "html",
];

/// Reads plain-text files. Anything else yields an `Error:` string.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn supports(path: &Path) -> bool {
        TEXT_EXTENSIONS.contains(&extension_of(path).as_str())
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Display name of an attachment: its file name, or the whole path.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[async_trait]
impl ContentExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> String {
        let ext = extension_of(path);
        if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
            let shown = if ext.is_empty() { "(none)" } else { ext.as_str() };
            return format!("Error: Unsupported file type: {shown}");
        }
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "attachment read");
                String::from_utf8_lossy(&bytes).into_owned()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read attachment");
                format!("Error: Could not process {}", file_name(path))
            }
        }
    }
}
