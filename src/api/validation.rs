use std::str::FromStr;

use super::ApiError;
use crate::domain::{ParseEnumError, format_day, parse_day};

pub fn validate_id(id: i32, resource: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {resource} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{field} is required")))
}

pub fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Normalizes a required calendar day to `YYYY-MM-DD`.
pub fn required_day(value: Option<String>, field: &str) -> Result<String, ApiError> {
    let value = required_text(value, field)?;
    parse_day(&value)
        .map(format_day)
        .ok_or_else(|| ApiError::validation(format!("{field} must be a date (YYYY-MM-DD)")))
}

pub fn validate_progress(progress: Option<i32>) -> Result<i32, ApiError> {
    let progress = progress.unwrap_or(0);
    if !(0..=100).contains(&progress) {
        return Err(ApiError::validation(format!(
            "Invalid progress: {progress}. Progress must be between 0 and 100"
        )));
    }
    Ok(progress)
}

pub fn validate_budget(budget: Option<f64>) -> Result<f64, ApiError> {
    required_non_negative(budget, "budget")
}

pub fn validate_rate(rate: Option<f64>) -> Result<f64, ApiError> {
    required_non_negative(rate, "rate")
}

fn required_non_negative(value: Option<f64>, field: &str) -> Result<f64, ApiError> {
    let value = value.ok_or_else(|| ApiError::validation(format!("{field} is required")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(value)
}

/// Minimal shape check: something on both sides of a single `@`.
pub fn required_email(value: Option<String>) -> Result<String, ApiError> {
    let email = required_text(value, "email")?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(ApiError::validation("Valid email is required")),
    }
}

/// Parses an optional enumeration value, falling back to `default`.
pub fn enum_or<T>(value: Option<String>, default: T) -> Result<T, ApiError>
where
    T: FromStr<Err = ParseEnumError>,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|e: ParseEnumError| ApiError::validation(e.to_string())),
    }
}

pub fn required_enum<T>(value: Option<String>, field: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = ParseEnumError>,
{
    required_text(value, field)?
        .parse()
        .map_err(|e: ParseEnumError| ApiError::validation(e.to_string()))
}
