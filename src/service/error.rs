//! Service Error Types

use crate::core::error_handling::ContextualError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// The request never produced a response
    #[error("Network error: {message}")]
    Network { message: String },

    /// Non-2xx status or an explicit error field in the body
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    /// Well-formed response without identifying product fields
    #[error("Product not found in database")]
    ProductNotFound { barcode: String },
}

impl ServiceError {
    pub(crate) fn status(status: reqwest::StatusCode) -> Self {
        ServiceError::Api {
            status: Some(status.as_u16()),
            message: format!(
                "API Error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Network {
            message: err.to_string(),
        }
    }
}

impl ContextualError for ServiceError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ServiceError::ProductNotFound { .. } => true, // Rescan or try another product
            ServiceError::Api { .. } => true,
            ServiceError::Network { .. } => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ServiceError::ProductNotFound { .. } => Some("Product not found in database"),
            ServiceError::Api { message, .. } => Some(message),
            ServiceError::Network { .. } => None,
        }
    }
}

/// Result type for product service calls
pub type ServiceResult<T> = Result<T, ServiceError>;
