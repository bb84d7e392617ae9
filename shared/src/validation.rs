//! Input validation functions
//!
//! Username, weekday and plan-window rules. Email and password lengths are
//! checked by the `validator` derives on the request types.
//!
//! Health values are deliberately not range-checked here; only shapes that
//! would corrupt stored data are rejected.

use chrono::{DateTime, Utc};

/// Validate username format
///
/// Letters, digits and `@ . + - _`, 3 to 150 characters.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if username.len() > 150 {
        return Err("Username too long".to_string());
    }
    let username_regex = regex_lite::Regex::new(r"^[A-Za-z0-9@.+\-_]+$").unwrap();
    if !username_regex.is_match(username) {
        return Err("Username may only contain letters, digits and @.+-_".to_string());
    }
    Ok(())
}

/// Validate an ISO weekday number (1 = Monday, 7 = Sunday)
pub fn validate_day_of_week(day: u8) -> Result<(), String> {
    if !(1..=7).contains(&day) {
        return Err("Day of week must be between 1 (Monday) and 7 (Sunday)".to_string());
    }
    Ok(())
}

/// Validate a plan window
///
/// The end may equal the start; it may not precede it.
pub fn validate_plan_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), String> {
    if end < start {
        return Err("Plan end time must not be before its start time".to_string());
    }
    Ok(())
}

/// Validate that a measurement is a real number
pub fn validate_finite(field: &str, value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err(format!("{} must be a valid number", field));
    }
    Ok(())
}
