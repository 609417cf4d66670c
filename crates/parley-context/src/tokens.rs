// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic token estimator.

const TOKENS_PER_WORD: f64 = 1.33;
const TOKENS_PER_PUNCTUATION: f64 = 0.7;
const TOKENS_PER_NON_ASCII: f64 = 1.5;
const TOKENS_PER_DIGIT: f64 = 0.5;

fn is_counted_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | '!' | '?' | ';' | ':' | '(' | ')' | '[' | ']' | '{' | '}' | '\'' | '"'
    )
}

/// Estimates how many tokens `text` occupies.
///
/// `ceil(words * 1.33 + punctuation * 0.7 + non_ascii * 1.5 + digits * 0.5)`,
/// computed over the text with whitespace runs collapsed. Blank input is 0.
pub fn estimate_token_count(text: &str) -> u64 {
    let mut words = 0u64;
    let mut punctuation = 0u64;
    let mut non_ascii = 0u64;
    let mut digits = 0u64;

    for word in text.split_whitespace() {
        words += 1;
        for c in word.chars() {
            if is_counted_punctuation(c) {
                punctuation += 1;
            } else if c.is_ascii_digit() {
                digits += 1;
            } else if !c.is_ascii() {
                non_ascii += 1;
            }
        }
    }

    if words == 0 {
        return 0;
    }

    // Collapsed whitespace is a single ASCII space, so the gaps between words
    // never contribute to the counts above.
    let estimate = words as f64 * TOKENS_PER_WORD
        + punctuation as f64 * TOKENS_PER_PUNCTUATION
        + non_ascii as f64 * TOKENS_PER_NON_ASCII
        + digits as f64 * TOKENS_PER_DIGIT;
    estimate.ceil() as u64
}

/// Estimates the tokens of a JSON value as it would be serialized.
///
/// `null` counts as nothing.
pub fn estimate_json_token_count(value: &serde_json::Value) -> u64 {
    if value.is_null() {
        return 0;
    }
    estimate_token_count(&value.to_string())
}
