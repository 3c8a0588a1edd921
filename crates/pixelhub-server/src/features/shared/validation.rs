//! Shared validation utilities
//!
//! Typed input checks used by dataset and cart commands.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be at most {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },

    #[error("{field} '{value}' is not a valid DOI")]
    InvalidDoi { field: &'static str, value: String },

    #[error("{field} cannot be negative")]
    Negative { field: &'static str },
}

/// Non-blank text of at most `max_length` characters.
pub fn validate_text(value: &str, field: &'static str, max_length: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    validate_length(value, field, max_length)
}

/// At most `max_length` characters, empty allowed.
pub fn validate_length(value: &str, field: &'static str, max_length: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max_length {
        return Err(ValidationError::TooLong { field, max_length });
    }
    Ok(())
}

/// A DOI is `10.<registrant>/<suffix>`.
pub fn is_valid_doi(doi: &str) -> bool {
    let Some(rest) = doi.strip_prefix("10.") else {
        return false;
    };
    match rest.split_once('/') {
        Some((registrant, suffix)) => {
            !registrant.is_empty()
                && registrant.chars().all(|c| c.is_ascii_digit() || c == '.')
                && !suffix.trim().is_empty()
        },
        None => false,
    }
}

/// Empty and absent DOIs are accepted.
pub fn validate_optional_doi(doi: Option<&str>, field: &'static str) -> Result<(), ValidationError> {
    match doi.map(str::trim) {
        Some(value) if !value.is_empty() && !is_valid_doi(value) => Err(ValidationError::InvalidDoi {
            field,
            value: value.to_string(),
        }),
        _ => Ok(()),
    }
}

pub fn validate_non_negative(value: i64, field: &'static str) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}
