//! Form validation shared by the admin UI and the API.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub const MAX_TEXT_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

fn gstin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9A-Z]{15}$").expect("gstin pattern is valid"))
}

pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", MAX_TEXT_LEN),
        ));
    }
    Ok(())
}

/// Normalize an Indian mobile number to its ten digits.
///
/// Spaces and dashes are ignored, as is a leading `+91`, `91` (on 12 digits)
/// or `0` (on 11 digits).
pub fn normalize_phone(value: &str) -> Option<String> {
    let mut digits: String = value
        .trim()
        .trim_start_matches('+')
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if digits.len() == 12 && digits.starts_with("91") {
        digits.drain(..2);
    } else if digits.len() == 11 && digits.starts_with('0') {
        digits.drain(..1);
    }
    if digits.len() != 10 || !matches!(digits.as_bytes()[0], b'6'..=b'9') {
        return None;
    }
    Some(digits)
}

pub fn phone(field: &'static str, value: &str) -> Result<(), ValidationError> {
    normalize_phone(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new(field, "must be a valid 10-digit mobile number"))
}

pub fn email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if email_regex().is_match(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be a valid email address"))
    }
}

pub fn gstin(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if gstin_regex().is_match(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            "must be 15 uppercase letters or digits",
        ))
    }
}

pub fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be greater than zero"))
    }
}

/// Upper bound for a rooftop system on a single residential connection.
pub const MAX_CAPACITY_KW: f64 = 500.0;

pub fn capacity_kw(field: &'static str, value: f64) -> Result<(), ValidationError> {
    positive(field, value)?;
    if value > MAX_CAPACITY_KW {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} kW", MAX_CAPACITY_KW),
        ));
    }
    Ok(())
}

pub fn percentage(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be between 0 and 100"))
    }
}

pub fn in_range(field: &'static str, value: i32, min: i32, max: i32) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must be between {} and {}", min, max),
        ))
    }
}

/// Apply `check` to an optional value, skipping `None`.
pub fn optional<T: ?Sized>(
    value: Option<&T>,
    check: impl FnOnce(&T) -> Result<(), ValidationError>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => check(v),
        None => Ok(()),
    }
}

/// Like [`optional`] but for text: blank strings are treated as absent.
pub fn optional_text(
    value: Option<&str>,
    check: impl FnOnce(&str) -> Result<(), ValidationError>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => check(v),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_common_formats() {
        assert!(phone("phone", "9876543210").is_ok());
        assert!(phone("phone", "+91 98765-43210").is_ok());
        assert!(phone("phone", "09876543210").is_ok());
        assert_eq!(
            normalize_phone("+91 98765 43210").as_deref(),
            Some("9876543210")
        );
    }

    #[test]
    fn phone_rejects_bad_numbers() {
        assert!(phone("phone", "12345").is_err());
        assert!(phone("phone", "5876543210").is_err());
        assert!(phone("phone", "98765abcde").is_err());
        assert!(phone("phone", "").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(email("email", "asha@example.in").is_ok());
        assert!(email("email", "a.b+c@mail.co.in").is_ok());
        assert!(email("email", "a@b").is_err());
        assert!(email("email", "no-at-sign.com").is_err());
    }

    #[test]
    fn required_trims_and_limits() {
        assert!(required("name", "  ").is_err());
        assert!(required("name", "Ravi").is_ok());
        assert!(required("name", &"x".repeat(256)).is_err());
    }

    #[test]
    fn numeric_checks() {
        assert!(positive("amount", 1.0).is_ok());
        assert!(positive("amount", 0.0).is_err());
        assert!(positive("amount", f64::NAN).is_err());
        assert!(percentage("rate", 10.5).is_ok());
        assert!(percentage("rate", 101.0).is_err());
        assert!(in_range("tenure", 60, 1, 360).is_ok());
        assert!(in_range("tenure", 0, 1, 360).is_err());
    }

    #[test]
    fn gstin_format() {
        assert!(gstin("gstin", "27AAPFU0939F1ZV").is_ok());
        assert!(gstin("gstin", "27aapfu0939f1zv").is_err());
    }

    #[test]
    fn optional_text_skips_blank() {
        assert!(optional_text(Some("  "), |v| email("email", v)).is_ok());
        assert!(optional_text(Some("bad"), |v| email("email", v)).is_err());
        assert!(optional(None::<&f64>, |v| positive("x", *v)).is_ok());
    }

    #[test]
    fn error_message_names_field() {
        let err = phone("phone", "1").unwrap_err();
        assert_eq!(err.to_string(), "phone: must be a valid 10-digit mobile number");
    }
}
