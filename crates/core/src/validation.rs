//! Request field validation
//!
//! Every mutation request is checked before it reaches storage. Failures
//! surface as [`Error::Validation`] naming the offending field.

use crate::error::{Error, Result};

/// Upper bound shared by free-text fields (names, specifications).
pub const MAX_TEXT_LEN: usize = 255;

/// A request that can check its own fields.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Require `value` to be non-blank and within `min..=max` characters.
pub fn require_len(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }

    let len = value.chars().count();
    if len < min || len > max {
        return Err(Error::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }

    Ok(())
}

/// Require a non-blank free-text field of at most [`MAX_TEXT_LEN`] characters.
pub fn require_text(field: &str, value: &str) -> Result<()> {
    require_len(field, value, 1, MAX_TEXT_LEN)
}

/// Require a positive surrogate key.
pub fn require_id(field: &str, id: i64) -> Result<()> {
    if id <= 0 {
        return Err(Error::Validation(format!("{field} must be a positive id")));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(Error::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}

/// Require a finite, non-negative amount.
pub fn require_amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}
