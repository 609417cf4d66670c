// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context usage meter: how much of the window a conversation fills.

use parley_core::types::Message;
use serde::Serialize;
use strum::Display;

use crate::tokens::estimate_token_count;

/// Human-friendly token count, e.g. `"512 tokens"`, `"4.1K tokens"`, `"33K tokens"`.
pub fn format_context_size(tokens: u64) -> String {
    if tokens < 1000 {
        format!("{tokens} tokens")
    } else if tokens < 10_000 {
        format!("{:.1}K tokens", tokens as f64 / 1000.0)
    } else {
        format!("{}K tokens", (tokens as f64 / 1000.0).round() as u64)
    }
}

/// Percentage of `max_context` used, capped at 100.
///
/// A zero-sized window is reported as full.
pub fn calculate_context_usage(tokens: u64, max_context: u64) -> u8 {
    if max_context == 0 {
        return 100;
    }
    let percent = (tokens as f64 / max_context as f64 * 100.0).round();
    percent.min(100.0) as u8
}

/// Estimates the tokens an attached file will add, from its size alone.
pub fn estimate_file_tokens(name: &str, mime: &str, size_bytes: u64) -> u64 {
    let kb = size_bytes as f64 / 1024.0;
    let name = name.to_ascii_lowercase();
    let per_kb = if mime.contains("text") || name.ends_with(".txt") || name.ends_with(".md") {
        200.0
    } else if mime.contains("pdf") || name.ends_with(".pdf") {
        150.0
    } else if mime.contains("spreadsheet") || name.ends_with(".xlsx") || name.ends_with(".csv") {
        100.0
    } else if mime.contains("word") || name.ends_with(".docx") || name.ends_with(".doc") {
        170.0
    } else {
        100.0
    };
    (kb * per_kb).ceil() as u64
}

/// Coarse severity of context usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum UsageLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl UsageLevel {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            0..50 => UsageLevel::Low,
            50..75 => UsageLevel::Moderate,
            75..90 => UsageLevel::High,
            _ => UsageLevel::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContextUsage {
    pub total_tokens: u64,
    pub max_tokens: u64,
    pub percent: u8,
    pub level: UsageLevel,
}

impl ContextUsage {
    /// `"<used> / <max> used"`.
    pub fn describe(&self) -> String {
        format!(
            "{} / {} used",
            format_context_size(self.total_tokens),
            format_context_size(self.max_tokens)
        )
    }
}

/// Sums the estimated tokens of a conversation, the pending input and any
/// attachments against the selected context window.
#[derive(Debug, Clone, Copy)]
pub struct ContextMeter {
    max_tokens: u64,
}

impl ContextMeter {
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens: u64::from(max_tokens),
        }
    }

    pub fn measure(&self, messages: &[Message], input: &str, attached_tokens: u64) -> ContextUsage {
        let message_tokens: u64 = messages
            .iter()
            .map(|m| estimate_token_count(&m.content))
            .sum();
        let total_tokens = message_tokens + estimate_token_count(input) + attached_tokens;
        let percent = calculate_context_usage(total_tokens, self.max_tokens);

        tracing::debug!(
            message_tokens,
            total_tokens,
            max_tokens = self.max_tokens,
            percent,
            "context usage measured"
        );

        ContextUsage {
            total_tokens,
            max_tokens: self.max_tokens,
            percent,
            level: UsageLevel::from_percent(percent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::types::Role;

    #[test]
    fn format_small_medium_large() {
        assert_eq!(format_context_size(0), "0 tokens");
        assert_eq!(format_context_size(999), "999 tokens");
        assert_eq!(format_context_size(4096), "4.1K tokens");
        assert_eq!(format_context_size(32768), "33K tokens");
        assert_eq!(format_context_size(131072), "131K tokens");
    }

    #[test]
    fn usage_is_rounded_and_capped() {
        assert_eq!(calculate_context_usage(0, 4096), 0);
        assert_eq!(calculate_context_usage(2048, 4096), 50);
        assert_eq!(calculate_context_usage(10_000, 4096), 100);
        assert_eq!(calculate_context_usage(1, 0), 100);
    }

    #[test]
    fn file_estimates_follow_type() {
        assert_eq!(estimate_file_tokens("notes.md", "", 1024), 200);
        assert_eq!(estimate_file_tokens("paper.pdf", "application/pdf", 1024), 150);
        assert_eq!(estimate_file_tokens("sheet.xlsx", "", 2048), 200);
        assert_eq!(estimate_file_tokens("report.docx", "", 1024), 170);
        assert_eq!(estimate_file_tokens("blob.bin", "application/octet-stream", 512), 50);
        // text/csv matches the text rule first
        assert_eq!(estimate_file_tokens("data.csv", "text/csv", 1024), 200);
    }

    #[test]
    fn levels_have_fixed_thresholds() {
        assert_eq!(UsageLevel::from_percent(49), UsageLevel::Low);
        assert_eq!(UsageLevel::from_percent(50), UsageLevel::Moderate);
        assert_eq!(UsageLevel::from_percent(75), UsageLevel::High);
        assert_eq!(UsageLevel::from_percent(90), UsageLevel::Critical);
        assert_eq!(UsageLevel::from_percent(100), UsageLevel::Critical);
    }

    #[test]
    fn meter_sums_messages_input_and_attachments() {
        let messages = vec![
            Message::new(Role::User, "hello"),
            Message::new(Role::Assistant, "hello"),
        ];
        let meter = ContextMeter::new(100);
        let usage = meter.measure(&messages, "hello", 4);
        assert_eq!(usage.total_tokens, 2 + 2 + 2 + 4);
        assert_eq!(usage.percent, 10);
        assert_eq!(usage.level, UsageLevel::Low);
        assert_eq!(usage.describe(), "10 tokens / 100 tokens used");
    }
}
