// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment content extraction.

use std::path::Path;

use async_trait::async_trait;

/// Prefix marking an extraction result as a failure description.
pub const EXTRACTION_ERROR_PREFIX: &str = "Error:";

/// Turns an attached file into text for the prompt.
///
/// Extraction never fails outright: problems come back as text starting with
/// [`EXTRACTION_ERROR_PREFIX`] so they can be shown to the model verbatim.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> String;
}

/// Returns true when an extraction result describes a failure.
pub fn is_extraction_error(text: &str) -> bool {
    text.starts_with(EXTRACTION_ERROR_PREFIX)
}
