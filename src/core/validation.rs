//! Validation helpers for configuration and CLI values

use crate::core::error_handling::ContextualError;

/// A configuration or argument value was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Longest accepted timeout: one day
pub const MAX_TIMEOUT_SECS: i64 = 86_400;

/// Validate a timeout given in whole seconds
pub fn validate_timeout_secs(key: &str, value: i64) -> Result<u64, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(&format!(
            "{} must be greater than 0 (got {})",
            key, value
        )));
    }
    if value > MAX_TIMEOUT_SECS {
        return Err(ValidationError::new(&format!(
            "{} must be at most {} seconds (got {})",
            key, MAX_TIMEOUT_SECS, value
        )));
    }
    Ok(value as u64)
}

/// Validate the product service base URL
///
/// Only http and https are accepted; a trailing slash is removed so endpoint
/// paths can be appended directly.
pub fn validate_api_url(url: &str) -> Result<String, ValidationError> {
    let trimmed = url.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ValidationError::new(&format!(
            "api-url '{}' must start with http:// or https://",
            url
        )));
    }
    let without_slash = trimmed.trim_end_matches('/');
    if without_slash.ends_with("://") {
        return Err(ValidationError::new(&format!(
            "api-url '{}' has no host",
            url
        )));
    }
    Ok(without_slash.to_string())
}

/// Validate a barcode typed on the command line
pub fn validate_barcode(code: &str) -> Result<String, ValidationError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("Barcode cannot be empty"));
    }
    if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(ValidationError::new(&format!(
            "Barcode '{}' contains whitespace or control characters",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}
