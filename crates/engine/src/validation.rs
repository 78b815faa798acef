//! Validation of user-supplied text before it enters a conversation.
//!
//! Every function here is pure. Budget and transaction amounts go through the
//! same parser so both flows accept exactly the same spellings.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, Money, ResultEngine};

pub const MAX_CATEGORY_CHARS: usize = 32;
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Returns `true` if `text` is a non-negative amount with at most two
/// fractional digits.
#[must_use]
pub fn is_valid_currency_amount(text: &str) -> bool {
    parse_amount(text).is_ok()
}

/// Parses a non-negative amount. Zero is accepted (a budget may be zero).
pub fn parse_amount(text: &str) -> ResultEngine<Money> {
    text.parse::<Money>()
}

/// Parses an amount that must be strictly positive (transaction amounts).
pub fn parse_positive_amount(text: &str) -> ResultEngine<Money> {
    let amount = parse_amount(text)?;
    if amount.is_zero() {
        return Err(EngineError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(amount)
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes a category name: NFKC, collapsed whitespace, bounded length.
pub fn normalize_category(text: &str) -> ResultEngine<String> {
    let normalized: String = text.nfkc().collect();
    let name = collapse_whitespace(&normalized);
    if name.is_empty() {
        return Err(EngineError::InvalidCategory(
            "category must not be empty".to_string(),
        ));
    }
    if name.starts_with('/') {
        return Err(EngineError::InvalidCategory(
            "category must not start with '/'".to_string(),
        ));
    }
    if name.chars().count() > MAX_CATEGORY_CHARS {
        return Err(EngineError::InvalidCategory(format!(
            "category must be at most {MAX_CATEGORY_CHARS} characters"
        )));
    }
    Ok(name)
}

/// Normalizes a free-text description.
pub fn normalize_description(text: &str) -> ResultEngine<String> {
    let description = collapse_whitespace(text);
    if description.is_empty() {
        return Err(EngineError::InvalidText(
            "description must not be empty".to_string(),
        ));
    }
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(EngineError::InvalidText(format!(
            "description must be at most {MAX_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(description)
}
