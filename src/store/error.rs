//! Store Error Types

use crate::core::error_handling::ContextualError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on '{key}': {message}")]
    Io { key: String, message: String },

    #[error("Could not encode '{key}': {message}")]
    Serialization { key: String, message: String },

    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub(crate) fn io(key: &str, err: std::io::Error) -> Self {
        StoreError::Io {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

impl ContextualError for StoreError {
    fn is_user_actionable(&self) -> bool {
        false // Disk full, permissions and the like are system issues
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
