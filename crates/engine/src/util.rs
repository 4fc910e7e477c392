//! Internal helpers for name validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! normalization so lookups and uniqueness checks agree on what "the same
//! name" means.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trim and collapse inner whitespace. Fails on empty input.
pub(crate) fn normalize_display(input: &str, label: &str) -> ResultEngine<String> {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(collapsed)
}

/// Case-insensitive comparison key for a display name.
pub(crate) fn normalize_key(display: &str) -> String {
    display
        .nfkc()
        .flat_map(char::to_lowercase)
        .collect::<String>()
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
