// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context-window accounting for Parley.
//!
//! Everything here is a cheap heuristic: Parley never runs a real tokenizer,
//! it estimates from words, punctuation, non-ASCII characters and digits so
//! the shell can warn before a prompt outgrows the model's context window.

pub mod meter;
pub mod sizes;
pub mod tokens;

pub use meter::{
    ContextMeter, ContextUsage, UsageLevel, calculate_context_usage, estimate_file_tokens,
    format_context_size,
};
pub use sizes::{CONTEXT_SIZES, available_context_sizes};
pub use tokens::{estimate_json_token_count, estimate_token_count};
