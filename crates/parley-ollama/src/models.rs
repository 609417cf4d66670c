// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context-length heuristics for locally installed models.

use parley_core::DEFAULT_CONTEXT_SIZE;

const BILLION: u64 = 1_000_000_000;

/// Parses labels such as `8B`, `8.0B`, `70b`, `500M` or `1.5K` into a
/// parameter count.
pub fn parse_parameter_size(label: &str) -> Option<u64> {
    let label = label.trim();
    let unit = label.chars().last()?;
    let number = &label[..label.len() - unit.len_utf8()];
    let multiplier = match unit.to_ascii_uppercase() {
        'B' => 1e9,
        'M' => 1e6,
        'K' => 1e3,
        'T' => 1e12,
        _ => return label.parse::<u64>().ok(),
    };
    let value: f64 = number.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// Estimates a model's usable context window from its family and size.
///
/// Unknown families and sizes fall back to 4096 tokens.
pub fn estimate_context_length(family: Option<&str>, parameters: Option<u64>) -> u32 {
    let family = family.unwrap_or_default().to_lowercase();
    let parameters = parameters.unwrap_or(0);

    if family.contains("llama") || family.contains("mistral") {
        match parameters {
            p if p >= 70 * BILLION => 32768,
            p if p >= 13 * BILLION => 16384,
            p if p >= 7 * BILLION => 8192,
            _ => DEFAULT_CONTEXT_SIZE,
        }
    } else if family.contains("gemma") {
        if parameters >= 7 * BILLION {
            8192
        } else {
            DEFAULT_CONTEXT_SIZE
        }
    } else if family.contains("mpt") {
        8192
    } else {
        DEFAULT_CONTEXT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_size_labels() {
        assert_eq!(parse_parameter_size("8B"), Some(8 * BILLION));
        assert_eq!(parse_parameter_size("8.0B"), Some(8 * BILLION));
        assert_eq!(parse_parameter_size("70b"), Some(70 * BILLION));
        assert_eq!(parse_parameter_size("500M"), Some(500_000_000));
        assert_eq!(parse_parameter_size("1234"), Some(1234));
        assert_eq!(parse_parameter_size(""), None);
        assert_eq!(parse_parameter_size("big"), None);
    }

    #[test]
    fn llama_and_mistral_scale_with_size() {
        assert_eq!(estimate_context_length(Some("llama"), Some(70 * BILLION)), 32768);
        assert_eq!(estimate_context_length(Some("Mistral"), Some(13 * BILLION)), 16384);
        assert_eq!(estimate_context_length(Some("llama"), Some(8 * BILLION)), 8192);
        assert_eq!(estimate_context_length(Some("llama"), Some(3 * BILLION)), 4096);
    }

    #[test]
    fn gemma_and_mpt() {
        assert_eq!(estimate_context_length(Some("gemma"), Some(7 * BILLION)), 8192);
        assert_eq!(estimate_context_length(Some("gemma2"), Some(2 * BILLION)), 4096);
        assert_eq!(estimate_context_length(Some("mpt"), None), 8192);
    }

    #[test]
    fn unknown_falls_back_to_default() {
        assert_eq!(estimate_context_length(Some("qwen2"), Some(72 * BILLION)), 4096);
        assert_eq!(estimate_context_length(None, None), 4096);
    }
}
