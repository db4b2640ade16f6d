//! Field validators applied at the facade boundary before any tier is called.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"^[0-9+\-\s()]+$").unwrap();
    static ref UPPERCASE_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref DIGIT_REGEX: Regex = Regex::new(r"[0-9]").unwrap();
    static ref SPECIAL_REGEX: Regex = Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap();
}

pub fn required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

pub fn min_chars(field: &str, value: &str, min: usize) -> Result<(), String> {
    required(field, value)?;
    if value.trim().chars().count() < min {
        return Err(format!("{} must be at least {} characters", field, min));
    }
    Ok(())
}

pub fn max_chars(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{} cannot exceed {} characters", field, max));
    }
    Ok(())
}

pub fn email(field: &str, value: &str) -> Result<(), String> {
    required(field, value)?;
    if !EMAIL_REGEX.is_match(value.trim()) {
        return Err(format!("{} is not a valid email address", field));
    }
    Ok(())
}

pub fn phone(field: &str, value: &str) -> Result<(), String> {
    required(field, value)?;
    if !PHONE_REGEX.is_match(value) {
        return Err(format!("{} is not a valid phone number", field));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: Decimal) -> Result<(), String> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("{} cannot be negative", field));
    }
    Ok(())
}

/// Password rules for a reset: length, uppercase, digit and special character
pub fn strong_password(value: &str) -> Result<(), String> {
    if value.chars().count() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if !UPPERCASE_REGEX.is_match(value) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !DIGIT_REGEX.is_match(value) {
        return Err("Password must contain at least one number".to_string());
    }
    if !SPECIAL_REGEX.is_match(value) {
        return Err("Password must contain at least one special character".to_string());
    }
    Ok(())
}

/// Apply a validator only when the optional field is present
pub fn when_some<T, F>(value: &Option<T>, check: F) -> Result<(), String>
where
    F: FnOnce(&T) -> Result<(), String>,
{
    match value {
        Some(v) => check(v),
        None => Ok(()),
    }
}
