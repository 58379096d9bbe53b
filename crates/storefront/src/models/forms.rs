//! Client-side form validation, server-enforced.
//!
//! Malformed phone numbers, pincodes, and emails are caught synchronously
//! before any record is created, and surfaced per-field so the UI can render
//! them inline next to the offending input. Nothing here reaches a backend.

use serde::{Deserialize, Serialize};

use renewly_core::{Email, EmailError};

/// One field that failed validation, with a message for inline display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate an Indian mobile number: ten digits, starting 6-9.
///
/// # Errors
///
/// Returns a [`FieldError`] keyed to `field` describing the problem.
pub fn validate_phone(field: &str, value: &str) -> Result<(), FieldError> {
    let digits: String = value.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    let valid = digits.len() == 10
        && digits.chars().all(|c| c.is_ascii_digit())
        && digits.starts_with(['6', '7', '8', '9']);
    if valid {
        Ok(())
    } else {
        Err(FieldError::new(field, "enter a 10-digit mobile number"))
    }
}

/// Validate an Indian postal pincode: six digits, not starting with 0.
///
/// # Errors
///
/// Returns a [`FieldError`] keyed to `field` describing the problem.
pub fn validate_pincode(field: &str, value: &str) -> Result<(), FieldError> {
    let valid = value.len() == 6
        && value.chars().all(|c| c.is_ascii_digit())
        && !value.starts_with('0');
    if valid {
        Ok(())
    } else {
        Err(FieldError::new(field, "enter a 6-digit pincode"))
    }
}

/// Validate an email address.
///
/// # Errors
///
/// Returns a [`FieldError`] keyed to `field` carrying the parse error
/// message.
pub fn validate_email(field: &str, value: &str) -> Result<Email, FieldError> {
    Email::parse(value).map_err(|error: EmailError| FieldError::new(field, error.to_string()))
}

/// Validate that a free-text field is non-blank.
///
/// # Errors
///
/// Returns a [`FieldError`] keyed to `field`.
pub fn validate_required(field: &str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::new(field, "this field is required"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_accepts_indian_mobiles() {
        assert!(validate_phone("phone", "9876543210").is_ok());
        assert!(validate_phone("phone", "98765 43210").is_ok());
        assert!(validate_phone("phone", "6000000000").is_ok());
    }

    #[test]
    fn test_phone_rejects_bad_numbers() {
        assert!(validate_phone("phone", "12345").is_err());
        assert!(validate_phone("phone", "1234567890").is_err()); // starts with 1
        assert!(validate_phone("phone", "98765432101").is_err()); // 11 digits
        assert!(validate_phone("phone", "98765abcde").is_err());
    }

    #[test]
    fn test_pincode() {
        assert!(validate_pincode("pincode", "560001").is_ok());
        assert!(validate_pincode("pincode", "056001").is_err());
        assert!(validate_pincode("pincode", "5600").is_err());
        assert!(validate_pincode("pincode", "56000a").is_err());
    }

    #[test]
    fn test_email_field_error_names_the_field() {
        let err = validate_email("business.email", "nope").unwrap_err();
        assert_eq!(err.field, "business.email");
    }

    #[test]
    fn test_required() {
        assert!(validate_required("company", "Apex").is_ok());
        assert!(validate_required("company", "   ").is_err());
    }
}
