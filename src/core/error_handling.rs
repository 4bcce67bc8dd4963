//! Generic error handling utilities
//!
//! Provides unified error reporting across the scanner, service, store and
//! configuration error types while keeping each domain's own wording.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// Errors raised during a scan attempt are shown to the user as status text.
/// User-actionable errors (permission denied, product not found, bad config)
/// carry a message written for the user; system errors (IO, transport) are
/// summarised with a generic context and their details go to the debug log.
///
/// # Implementation Consistency
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)`. When it returns `false`, `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message the user can act on
    ///
    /// Examples of user-actionable errors:
    /// - Camera permission denied
    /// - Product not found in the database
    /// - Invalid configuration values
    ///
    /// Examples of system errors:
    /// - Persistence IO failures
    /// - Transport failures talking to the product service
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// # Arguments
/// * `error` - The error to handle (must implement ContextualError)
/// * `operation_context` - Human-readable description of the operation that failed
///
/// # Examples
/// ```rust,no_run
/// # use ecoscan::core::error_handling::log_error_with_context;
/// # use ecoscan::core::validation::ValidationError;
/// let err = ValidationError::new("scan-timeout must be greater than 0");
/// log_error_with_context(&err, "Configuration loading");
/// // Logs: "FAILED: scan-timeout must be greater than 0"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("FAILED: {}", user_msg);
        }
        _ => {
            log::error!("FAILED: {}", operation_context);
        }
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Text shown on the presentation surface for an error
///
/// User-actionable errors show their own message; everything else falls back
/// to the error's `Display` output, which is still phrased for a status line.
pub fn status_text<E: ContextualError + std::fmt::Display>(error: &E) -> String {
    if error.is_user_actionable() {
        if let Some(msg) = error.user_message() {
            return msg.to_string();
        }
    }
    error.to_string()
}
