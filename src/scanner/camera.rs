//! Camera abstraction

use crate::scanner::types::PermissionState;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    /// The platform cannot report the permission state; request access instead
    #[error("permission query not supported")]
    QueryUnsupported,
    #[error("{0}")]
    AccessDenied(String),
    #[error("{0}")]
    Unavailable(String),
}

/// A video source the barcode decoder reads from
///
/// The controller drives the device: permission first, then the stream,
/// then `release` on every exit path. `release` must be idempotent.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Whether the platform has a camera capability at all
    fn is_supported(&self) -> bool;

    async fn query_permission(&self) -> Result<PermissionState, CameraError>;

    /// Ask for camera access, prompting the user when needed
    async fn request_access(&mut self) -> Result<(), CameraError>;

    /// Attach the stream and start feeding the decoder
    async fn start_stream(&mut self) -> Result<(), CameraError>;

    fn release(&mut self);
}
