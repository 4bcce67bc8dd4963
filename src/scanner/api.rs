//! Scanner API
//!
//! Public interface of the scan session controller. External modules should
//! import from here rather than directly from internal modules.

pub use crate::scanner::camera::{CameraDevice, CameraError};
pub use crate::scanner::controller::{
    ControllerConfig, DecodeSender, ScanSessionController, SessionHandle, DEFAULT_SCAN_TIMEOUT,
};
pub use crate::scanner::error::{ErrorKind, ScanError, ScanResult};
pub use crate::scanner::lookup::LookupPipeline;
pub use crate::scanner::types::{DecodeAttempt, PermissionState, SessionSnapshot, SessionState};
