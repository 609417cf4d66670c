// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context window sizes offered to the user.

/// Context sizes the user may pick from, smallest first.
pub const CONTEXT_SIZES: [u32; 6] = [4096, 8192, 16384, 32768, 65536, 131072];

/// The selectable sizes that fit within a model's context length.
///
/// The smallest size is always offered, even for models reporting less.
pub fn available_context_sizes(model_context_length: u32) -> Vec<u32> {
    let sizes: Vec<u32> = CONTEXT_SIZES
        .iter()
        .copied()
        .filter(|size| *size <= model_context_length)
        .collect();
    if sizes.is_empty() {
        vec![CONTEXT_SIZES[0]]
    } else {
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_model_length() {
        assert_eq!(available_context_sizes(16384), vec![4096, 8192, 16384]);
        assert_eq!(available_context_sizes(20000), vec![4096, 8192, 16384]);
        assert_eq!(available_context_sizes(200_000).len(), CONTEXT_SIZES.len());
    }

    #[test]
    fn tiny_models_still_get_the_minimum() {
        assert_eq!(available_context_sizes(2048), vec![4096]);
    }
}
