//! Camera start-up pipeline
//!
//! Runs in its own task so the controller keeps reading commands while the
//! user answers a permission prompt or the stream is being attached. Each
//! step is reported back tagged with the session it belongs to.

use crate::scanner::camera::CameraDevice;
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::types::PermissionState;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

pub(crate) type SharedCamera = Arc<Mutex<Box<dyn CameraDevice>>>;

#[derive(Debug)]
pub(crate) enum StartupStep {
    Permission(PermissionState),
    StartingCamera,
    Finished(ScanResult<()>),
}

#[derive(Debug)]
pub(crate) struct StartupUpdate {
    pub session_id: u64,
    pub step: StartupStep,
}

struct Reporter {
    session_id: u64,
    updates: mpsc::UnboundedSender<StartupUpdate>,
}

impl Reporter {
    fn send(&self, step: StartupStep) {
        let update = StartupUpdate {
            session_id: self.session_id,
            step,
        };
        if self.updates.send(update).is_err() {
            log::debug!("Scan controller is gone, dropping start-up progress");
        }
    }
}

/// Spawn permission resolution followed by stream acquisition
pub(crate) fn spawn_startup(
    camera: SharedCamera,
    session_id: u64,
    updates: mpsc::UnboundedSender<StartupUpdate>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reporter = Reporter {
            session_id,
            updates,
        };
        let result = acquire_camera(&camera, &reporter).await;
        reporter.send(StartupStep::Finished(result));
    })
}

async fn acquire_camera(camera: &SharedCamera, reporter: &Reporter) -> ScanResult<()> {
    let mut camera = camera.lock().await;
    check_permission(&mut **camera, reporter).await?;

    reporter.send(StartupStep::StartingCamera);
    camera
        .start_stream()
        .await
        .map_err(|e| ScanError::camera_start_failed(&e.to_string()))
}

// Query first; a prompt or an unqueryable platform falls back to one access request
async fn check_permission(camera: &mut dyn CameraDevice, reporter: &Reporter) -> ScanResult<()> {
    if !camera.is_supported() {
        return Err(ScanError::camera_unsupported());
    }

    match camera.query_permission().await {
        Ok(PermissionState::Granted) => {
            reporter.send(StartupStep::Permission(PermissionState::Granted));
            return Ok(());
        }
        Ok(PermissionState::Denied) => {
            reporter.send(StartupStep::Permission(PermissionState::Denied));
            return Err(ScanError::permission_denied());
        }
        Ok(PermissionState::Prompt) => {
            reporter.send(StartupStep::Permission(PermissionState::Prompt));
            log::debug!("Camera permission is prompt, requesting access");
        }
        Err(e) => {
            log::debug!("Cannot query camera permission ({}), requesting access", e);
        }
    }

    match camera.request_access().await {
        Ok(()) => {
            reporter.send(StartupStep::Permission(PermissionState::Granted));
            Ok(())
        }
        Err(e) => {
            reporter.send(StartupStep::Permission(PermissionState::Denied));
            Err(ScanError::access_failed(&e.to_string()))
        }
    }
}
