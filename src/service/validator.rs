// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request validation, run before any embedding call.
//!
//! Batch content is validated all-or-nothing: the first empty item fails
//! the whole request and no item is ever dropped, so `vectors[i]` always
//! corresponds to `texts[i]`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Text cannot be empty or whitespace only")]
    EmptyText,

    #[error("Item at index {index} is empty. All batch items must be valid non-empty text.")]
    EmptyBatchItem { index: usize },

    #[error("Batch must contain between 1 and {max} texts (got {count})")]
    BatchSize { count: usize, max: usize },
}

impl ValidationError {
    /// Request field the error refers to, e.g. `texts[1]`
    pub fn field(&self) -> String {
        match self {
            ValidationError::EmptyText => "text".to_string(),
            ValidationError::EmptyBatchItem { index } => format!("texts[{}]", index),
            ValidationError::BatchSize { .. } => "texts".to_string(),
        }
    }
}

/// Unicode whitespace plus the ASCII information separators U+001C..=U+001F
fn is_blank(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Returns the trimmed text, or `EmptyText` if nothing is left
pub fn validate_text(text: &str) -> Result<&str, ValidationError> {
    let trimmed = text.trim_matches(is_blank);
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(trimmed)
}

/// Cardinality check: 1..=max items
pub fn validate_batch_size(count: usize, max: usize) -> Result<(), ValidationError> {
    if count == 0 || count > max {
        return Err(ValidationError::BatchSize { count, max });
    }
    Ok(())
}

/// Validates every item and returns the trimmed texts in input order.
///
/// Fails on the first item that is empty after trimming, reporting its
/// zero-based position.
pub fn validate_batch<S: AsRef<str>>(
    texts: &[S],
    max: usize,
) -> Result<Vec<String>, ValidationError> {
    validate_batch_size(texts.len(), max)?;

    texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            validate_text(text.as_ref())
                .map(str::to_string)
                .map_err(|_| ValidationError::EmptyBatchItem { index })
        })
        .collect()
}
