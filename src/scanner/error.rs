//! Scanner Error Types

use crate::core::error_handling::ContextualError;
use crate::service::api::ServiceError;
use std::time::Duration;
use strum_macros::{Display, IntoStaticStr};

/// Category of a failed scan attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    PermissionDenied,
    CameraUnavailable,
    DecodeTimeout,
    NetworkError,
    ApiError,
    ProductNotFound,
    /// The decoder stream broke while scanning
    StreamFault,
}

/// A failed scan attempt; the message is written for the status line
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ScanError {
    kind: ErrorKind,
    message: String,
}

impl ScanError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn camera_unsupported() -> Self {
        Self::new(
            ErrorKind::CameraUnavailable,
            "Camera not supported on this device",
        )
    }

    pub fn camera_start_failed(reason: &str) -> Self {
        Self::new(
            ErrorKind::CameraUnavailable,
            format!("Failed to start camera: {}", reason),
        )
    }

    pub fn permission_denied() -> Self {
        Self::new(
            ErrorKind::PermissionDenied,
            "Camera permission denied. Please allow camera access and try again.",
        )
    }

    pub fn access_failed(reason: &str) -> Self {
        Self::new(
            ErrorKind::PermissionDenied,
            format!(
                "Camera access failed: {}. Please allow camera access and try again.",
                reason
            ),
        )
    }

    pub fn timed_out(window: Duration) -> Self {
        Self::new(
            ErrorKind::DecodeTimeout,
            format!(
                "Scan timeout - no barcode detected within {} seconds",
                window.as_secs()
            ),
        )
    }

    pub fn stream_fault(reason: &str) -> Self {
        Self::new(ErrorKind::StreamFault, format!("Scan error: {}", reason))
    }
}

impl From<ServiceError> for ScanError {
    fn from(err: ServiceError) -> Self {
        let kind = match &err {
            ServiceError::Network { .. } => ErrorKind::NetworkError,
            ServiceError::Api { .. } => ErrorKind::ApiError,
            ServiceError::ProductNotFound { .. } => ErrorKind::ProductNotFound,
        };
        Self::new(kind, err.to_string())
    }
}

impl ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        match self.kind {
            ErrorKind::PermissionDenied => true,
            ErrorKind::CameraUnavailable => true,
            ErrorKind::DecodeTimeout => true,
            ErrorKind::ProductNotFound => true,
            ErrorKind::ApiError => true,
            ErrorKind::NetworkError => false,
            ErrorKind::StreamFault => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        if self.is_user_actionable() {
            Some(&self.message)
        } else {
            None
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
