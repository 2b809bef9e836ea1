//! Field-level validation shared by trade, investment and wallet drafts.

use crate::domain::Decimal;
use serde::Serialize;
use thiserror::Error;

/// A field that violates a stated constraint.
///
/// Raised before any derived computation runs.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {constraint}")]
pub struct ValidationError {
    pub field: &'static str,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: &'static str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

/// Upper bound on any caller-supplied price, quantity, fee, investment
/// amount or wallet balance. Keeps every derived product inside the
/// decimal range.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

fn require_at_most_max(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value > Decimal::from(MAX_AMOUNT) {
        Err(ValidationError::new(
            field,
            format!("must not exceed {}", MAX_AMOUNT),
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn require_positive(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if !value.is_positive() {
        return Err(ValidationError::new(field, "must be greater than 0"));
    }
    require_at_most_max(field, value)
}

pub(crate) fn require_positive_opt(
    field: &'static str,
    value: Option<Decimal>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => require_positive(field, v),
        None => Ok(()),
    }
}

pub(crate) fn require_non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value.is_negative() {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    require_at_most_max(field, value)
}

/// Trim `value` and reject it when blank or longer than `max_len` characters.
pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if trimmed.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }
    Ok(trimmed.to_string())
}

/// Like [`require_text`] for optional fields; blank input becomes `None`.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max_len: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => require_text(field, s, max_len).map(Some),
        None => Ok(None),
    }
}
