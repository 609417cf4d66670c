// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental decoder for newline-delimited JSON generation streams.
//!
//! Network reads do not respect line boundaries, so bytes are buffered and
//! only complete lines are decoded. Splitting happens on raw bytes, before
//! UTF-8 decoding, which keeps multi-byte characters that straddle two reads
//! intact. A line that is not valid JSON gets one retry with control
//! characters removed; if that also fails the line is dropped and decoding
//! carries on with the next one.

use tracing::{debug, warn};

use crate::types::GenerateChunk;

/// Why a line produced no text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only line.
    Blank,
    /// Valid record without text, e.g. the final `done: true` line.
    NoText,
    /// The endpoint reported an error inside the stream.
    ProviderError(String),
    /// Not JSON, even after removing control characters.
    Malformed,
}

/// One decoded line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Fragment(String),
    Skipped(SkipReason),
}

impl Record {
    pub fn into_fragment(self) -> Option<String> {
        match self {
            Record::Fragment(text) => Some(text),
            Record::Skipped(_) => None,
        }
    }
}

/// Removes Unicode control characters (U+0000–U+001F and U+007F–U+009F).
pub fn strip_control_chars(line: &str) -> String {
    line.chars().filter(|c| !c.is_control()).collect()
}

/// Decodes a single complete line.
pub fn decode_line(line: &str) -> Record {
    if line.trim().is_empty() {
        return Record::Skipped(SkipReason::Blank);
    }

    let chunk = match serde_json::from_str::<GenerateChunk>(line) {
        Ok(chunk) => chunk,
        Err(first) => match serde_json::from_str::<GenerateChunk>(&strip_control_chars(line)) {
            Ok(chunk) => {
                debug!(error = %first, "line parsed after stripping control characters");
                chunk
            }
            Err(e) => {
                warn!(error = %e, line_len = line.len(), "dropping malformed stream line");
                return Record::Skipped(SkipReason::Malformed);
            }
        },
    };

    match chunk {
        GenerateChunk {
            response: Some(text),
            ..
        } if !text.is_empty() => Record::Fragment(text),
        GenerateChunk {
            error: Some(message),
            ..
        } => {
            warn!(error = %message, "endpoint reported an error in the stream");
            Record::Skipped(SkipReason::ProviderError(message))
        }
        _ => Record::Skipped(SkipReason::NoText),
    }
}

/// Buffers raw body chunks and yields one [`Record`] per complete line.
///
/// Use a fresh decoder per response; it holds the partial trailing line of
/// the previous read and nothing else.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one network read and returns the records of every line it
    /// completed, in arrival order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Record> {
        self.pending.extend_from_slice(bytes);

        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..last_newline]
            .split(|b| *b == b'\n')
            .map(|line| decode_line(&String::from_utf8_lossy(line)))
            .collect()
    }

    /// Signals end of stream. A trailing line without a newline is decoded
    /// as the final record.
    pub fn finish(&mut self) -> Option<Record> {
        if self.pending.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.pending);
        Some(decode_line(&String::from_utf8_lossy(&line)))
    }

    /// Bytes held back waiting for a newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
