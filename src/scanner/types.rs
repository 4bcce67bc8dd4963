//! Session state types

use crate::scanner::error::ScanError;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Lifecycle of one barcode acquisition session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SessionState {
    Idle,
    CheckingPermission,
    StartingCamera,
    Scanning,
    Detected,
    TimedOut,
    Error,
}

impl SessionState {
    /// Status line shown while in this state
    pub fn status_text(self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::CheckingPermission => "Checking camera permissions...",
            SessionState::StartingCamera => "Starting camera...",
            SessionState::Scanning => "Scanning for barcodes...",
            SessionState::Detected => "Barcode detected!",
            SessionState::TimedOut => "Scan timeout",
            SessionState::Error => "Scan error",
        }
    }

    /// A session in this state refuses a new start request
    pub fn is_active(self) -> bool {
        !matches!(
            self,
            SessionState::Idle | SessionState::TimedOut | SessionState::Error
        )
    }
}

/// Last observed camera permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    /// The user has not decided yet; requesting access will ask
    Prompt,
}

impl PermissionState {
    pub fn status_text(self) -> &'static str {
        match self {
            PermissionState::Granted => "✓ Camera permission granted",
            PermissionState::Denied => "✗ Camera permission denied",
            PermissionState::Prompt => "⚠ Camera permission required",
        }
    }
}

/// One result from the barcode decoder
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeAttempt {
    /// A barcode was read
    Decoded(String),
    /// Nothing recognisable in the frame; routine while scanning
    NotFound,
    /// The decoder or its stream broke, e.g. the camera was disconnected
    Failure(String),
}

/// Read-only view of the controller for presentation surfaces
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Increases with every accepted start request
    pub session_id: u64,
    pub state: SessionState,
    pub permission: Option<PermissionState>,
    /// Code accepted in the current session
    pub last_code: Option<String>,
    pub last_error: Option<ScanError>,
    pub lookup_in_flight: bool,
    pub camera_active: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            session_id: 0,
            state: SessionState::Idle,
            permission: None,
            last_code: None,
            last_error: None,
            lookup_in_flight: false,
            camera_active: false,
        }
    }
}

impl SessionSnapshot {
    pub fn status_text(&self) -> &'static str {
        self.state.status_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_state_names_are_kebab_case() {
        assert_eq!(SessionState::CheckingPermission.to_string(), "checking-permission");
        assert_eq!(SessionState::TimedOut.to_string(), "timed-out");
        assert_eq!(
            SessionState::from_str("starting-camera").unwrap(),
            SessionState::StartingCamera
        );
        let name: &'static str = SessionState::Detected.into();
        assert_eq!(name, "detected");
    }

    #[test]
    fn test_only_terminal_states_accept_a_new_start() {
        let startable: Vec<SessionState> = SessionState::iter().filter(|s| !s.is_active()).collect();
        assert_eq!(
            startable,
            vec![SessionState::Idle, SessionState::TimedOut, SessionState::Error]
        );
    }

    #[test]
    fn test_status_texts() {
        assert_eq!(SessionState::Scanning.status_text(), "Scanning for barcodes...");
        assert_eq!(
            SessionSnapshot::default().status_text(),
            SessionState::Idle.status_text()
        );
        assert_eq!(
            PermissionState::Prompt.status_text(),
            "⚠ Camera permission required"
        );
        assert_eq!(PermissionState::from_str("denied").unwrap(), PermissionState::Denied);
    }
}
