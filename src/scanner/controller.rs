//! Scan Session Controller
//!
//! A single task owns the session state and serialises everything that can
//! change it: start/stop commands, decoder output, lookup completions and
//! the acquisition deadline. Camera start-up and lookups run in their own
//! tasks so a stop request is honoured while either is outstanding.

use crate::core::error_handling::log_error_with_context;
use crate::notifications::api::{
    publish_event, Event, EventFilter, EventReceiver, NotificationService, SessionEvent,
    SessionEventType, SubscriberStatistics,
};
use crate::scanner::camera::CameraDevice;
use crate::scanner::error::{ErrorKind, ScanError, ScanResult};
use crate::scanner::lookup::LookupPipeline;
use crate::scanner::startup::{spawn_startup, SharedCamera, StartupStep, StartupUpdate};
use crate::scanner::types::{DecodeAttempt, PermissionState, SessionSnapshot, SessionState};
use crate::store::api::ProductRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Acquisition window when none is configured
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(30);

const DECODE_CHANNEL_CAPACITY: usize = 32;

/// Where the decoder pushes its results
pub type DecodeSender = mpsc::Sender<DecodeAttempt>;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub scan_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }
}

enum Command {
    Start(oneshot::Sender<bool>),
    Stop(oneshot::Sender<()>),
}

struct LookupCompletion {
    session_id: u64,
    barcode: String,
    result: ScanResult<ProductRecord>,
}

/// Client side of a running controller
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    decodes: DecodeSender,
    snapshot: watch::Receiver<SessionSnapshot>,
    notifications: NotificationService,
}

impl SessionHandle {
    /// Start a session unless one is already active
    ///
    /// Returns `true` once the controller has accepted the request and moved
    /// to `CheckingPermission`; the rest of the start-up runs in the
    /// controller. Returns `false` for a no-op or a stopped controller.
    pub async fn start_session(&self) -> bool {
        let (ack, accepted) = oneshot::channel();
        if self.commands.send(Command::Start(ack)).is_err() {
            return false;
        }
        accepted.await.unwrap_or(false)
    }

    /// Stop the current session; returns once the controller is `Idle`
    pub async fn stop_session(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Stop(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Feed one decoded barcode to the controller
    pub async fn on_decode_event(&self, raw_text: &str) {
        let attempt = DecodeAttempt::Decoded(raw_text.to_string());
        if self.decodes.send(attempt).await.is_err() {
            log::debug!("Scan controller is gone, dropping decode of '{}'", raw_text);
        }
    }

    pub fn decode_sender(&self) -> DecodeSender {
        self.decodes.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Wait for a snapshot matching `predicate`
    ///
    /// Returns `None` if the controller stops first.
    pub async fn wait_until(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Option<SessionSnapshot> {
        let mut rx = self.snapshot.clone();
        rx.wait_for(predicate).await.ok().map(|s| (*s).clone())
    }

    pub async fn subscribe(&self, subscriber_id: &str, filter: EventFilter) -> EventReceiver {
        self.notifications.lock().await.subscribe(
            subscriber_id.to_string(),
            filter,
            "scanner:session".to_string(),
        )
    }

    /// Drop a subscription, returning what it was delivered
    pub async fn unsubscribe(&self, subscriber_id: &str) -> Option<SubscriberStatistics> {
        self.notifications.lock().await.unsubscribe(subscriber_id)
    }
}

pub struct ScanSessionController {
    camera: SharedCamera,
    startup: Option<JoinHandle<()>>,
    lookup: LookupPipeline,
    config: ControllerConfig,

    session_id: u64,
    state: SessionState,
    permission: Option<PermissionState>,
    accepted_code: Option<String>,
    last_error: Option<ScanError>,
    lookup_in_flight: bool,
    camera_active: bool,
    deadline: Option<Instant>,

    snapshot_tx: watch::Sender<SessionSnapshot>,
    completion_tx: mpsc::UnboundedSender<LookupCompletion>,
    completions: mpsc::UnboundedReceiver<LookupCompletion>,
    startup_tx: mpsc::UnboundedSender<StartupUpdate>,
    startup_updates: mpsc::UnboundedReceiver<StartupUpdate>,
}

impl ScanSessionController {
    pub fn new(
        camera: impl CameraDevice + 'static,
        lookup: LookupPipeline,
        config: ControllerConfig,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let (startup_tx, startup_updates) = mpsc::unbounded_channel();
        let camera: Box<dyn CameraDevice> = Box::new(camera);

        Self {
            camera: Arc::new(Mutex::new(camera)),
            startup: None,
            lookup,
            config,
            session_id: 0,
            state: SessionState::Idle,
            permission: None,
            accepted_code: None,
            last_error: None,
            lookup_in_flight: false,
            camera_active: false,
            deadline: None,
            snapshot_tx,
            completion_tx,
            completions,
            startup_tx,
            startup_updates,
        }
    }

    /// Run the controller on the current runtime
    ///
    /// The task ends, releasing the camera, when every handle is dropped.
    pub fn spawn(self) -> (SessionHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (decode_tx, decode_rx) = mpsc::channel(DECODE_CHANNEL_CAPACITY);

        let handle = SessionHandle {
            commands: command_tx,
            decodes: decode_tx,
            snapshot: self.snapshot_tx.subscribe(),
            notifications: self.lookup.notifications().clone(),
        };

        let task = tokio::spawn(self.run(command_rx, decode_rx));
        (handle, task)
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut decodes: mpsc::Receiver<DecodeAttempt>,
    ) {
        log::debug!(
            "Scan controller started (acquisition window {}s)",
            self.config.scan_timeout.as_secs()
        );

        loop {
            let deadline = self.deadline;

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Start(ack)) => self.handle_start(ack).await,
                    Some(Command::Stop(ack)) => {
                        self.stop().await;
                        let _ = ack.send(());
                    }
                    None => break,
                },

                Some(attempt) = decodes.recv() => self.handle_decode(attempt).await,

                Some(update) = self.startup_updates.recv() => {
                    self.handle_startup(update).await
                }

                Some(completion) = self.completions.recv() => {
                    self.handle_completion(completion).await
                }

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() => self.handle_timeout().await,
            }
        }

        self.cancel_startup().await;
        self.release_camera().await;
        log::debug!("Scan controller stopped");
    }

    async fn handle_start(&mut self, ack: oneshot::Sender<bool>) {
        if self.state.is_active() {
            log::debug!(
                "Start ignored, session {} is {}",
                self.session_id,
                self.state
            );
            let _ = ack.send(false);
            return;
        }

        self.session_id += 1;
        self.accepted_code = None;
        self.last_error = None;
        log::info!("Starting scan session {}", self.session_id);
        self.transition(SessionState::CheckingPermission).await;
        let _ = ack.send(true);

        self.startup = Some(spawn_startup(
            self.camera.clone(),
            self.session_id,
            self.startup_tx.clone(),
        ));
    }

    async fn handle_startup(&mut self, update: StartupUpdate) {
        let starting = matches!(
            self.state,
            SessionState::CheckingPermission | SessionState::StartingCamera
        );
        if update.session_id != self.session_id || !starting {
            log::trace!(
                "Dropping start-up step of session {}: {:?}",
                update.session_id,
                update.step
            );
            return;
        }

        match update.step {
            StartupStep::Permission(permission) => self.set_permission(permission),
            StartupStep::StartingCamera => self.transition(SessionState::StartingCamera).await,
            StartupStep::Finished(Ok(())) => {
                self.startup = None;
                self.camera_active = true;
                self.deadline = Instant::now().checked_add(self.config.scan_timeout);
                if self.deadline.is_none() {
                    log::debug!("Acquisition window too large, scanning without a deadline");
                }
                self.transition(SessionState::Scanning).await;
            }
            StartupStep::Finished(Err(e)) => {
                self.startup = None;
                self.fail_session(e).await;
            }
        }
    }

    // Aborting drops the task's camera lock, so release can follow
    async fn cancel_startup(&mut self) {
        if let Some(task) = self.startup.take() {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    log::debug!("Camera start-up ended abnormally: {}", e);
                }
            }
            log::debug!("Camera start-up cancelled");
        }
    }

    async fn handle_decode(&mut self, attempt: DecodeAttempt) {
        match attempt {
            DecodeAttempt::NotFound => {}
            DecodeAttempt::Failure(reason) if self.state == SessionState::Scanning => {
                self.fail_session(ScanError::stream_fault(&reason)).await;
            }
            DecodeAttempt::Failure(reason) => {
                log::trace!("Decoder fault while {}: {}", self.state, reason);
            }
            DecodeAttempt::Decoded(raw_text) => self.accept_code(raw_text).await,
        }
    }

    async fn accept_code(&mut self, raw_text: String) {
        if self.state != SessionState::Scanning {
            log::trace!("Ignoring '{}' while {}", raw_text, self.state);
            return;
        }
        if raw_text.is_empty() {
            return;
        }
        if self.accepted_code.as_deref() == Some(raw_text.as_str()) {
            log::trace!("Ignoring duplicate '{}'", raw_text);
            return;
        }
        if self.lookup_in_flight {
            log::debug!("Ignoring '{}', a lookup is still in flight", raw_text);
            return;
        }

        log::info!("Barcode detected: {}", raw_text);
        self.accepted_code = Some(raw_text.clone());
        self.lookup_in_flight = true;
        self.deadline = None;
        self.release_camera().await;
        self.transition(SessionState::Detected).await;
        self.publish(
            SessionEvent::new(SessionEventType::CodeAccepted, self.session_id, self.state)
                .with_barcode(&raw_text),
        )
        .await;

        let lookup = self.lookup.clone();
        let completions = self.completion_tx.clone();
        let session_id = self.session_id;
        tokio::spawn(async move {
            let result = lookup.lookup_and_persist(&raw_text).await;
            let completion = LookupCompletion {
                session_id,
                barcode: raw_text,
                result,
            };
            if completions.send(completion).is_err() {
                log::debug!("Scan controller is gone, dropping lookup result");
            }
        });
    }

    async fn handle_completion(&mut self, completion: LookupCompletion) {
        self.lookup_in_flight = false;
        let current = completion.session_id == self.session_id;

        match completion.result {
            Ok(product) => {
                self.publish(
                    SessionEvent::new(
                        SessionEventType::ProductFound,
                        completion.session_id,
                        self.state,
                    )
                    .with_product(product),
                )
                .await;
            }
            Err(error) => {
                log_error_with_context(&error, "Product lookup");
                if current {
                    self.last_error = Some(error.clone());
                }
                self.publish(
                    SessionEvent::new(
                        SessionEventType::LookupFailed,
                        completion.session_id,
                        self.state,
                    )
                    .with_barcode(&completion.barcode)
                    .with_error(error.kind(), error.message().to_string()),
                )
                .await;
            }
        }

        if current && self.state == SessionState::Detected {
            self.transition(SessionState::Idle).await;
        } else {
            log::debug!(
                "Lookup for '{}' from session {} finished after the session moved on",
                completion.barcode,
                completion.session_id
            );
            self.publish_snapshot();
        }
    }

    async fn handle_timeout(&mut self) {
        self.deadline = None;
        if self.state == SessionState::Scanning {
            log::info!("Scan timeout reached");
            self.fail_session(ScanError::timed_out(self.config.scan_timeout))
                .await;
        }
    }

    async fn stop(&mut self) {
        self.deadline = None;
        self.cancel_startup().await;
        self.release_camera().await;
        if self.state != SessionState::Idle {
            log::info!("Stopping scan session {}", self.session_id);
        }
        self.transition(SessionState::Idle).await;
    }

    async fn fail_session(&mut self, error: ScanError) {
        log_error_with_context(&error, "Scan session");
        self.deadline = None;
        self.release_camera().await;
        self.last_error = Some(error.clone());

        let next = if error.kind() == ErrorKind::DecodeTimeout {
            SessionState::TimedOut
        } else {
            SessionState::Error
        };
        self.transition(next).await;
        self.publish(
            SessionEvent::new(SessionEventType::SessionFailed, self.session_id, next)
                .with_error(error.kind(), error.message().to_string()),
        )
        .await;
    }

    async fn release_camera(&mut self) {
        self.camera.lock().await.release();
        if self.camera_active {
            self.camera_active = false;
            log::debug!("Camera released");
        }
    }

    fn set_permission(&mut self, permission: PermissionState) {
        log::debug!("Camera permission: {}", permission);
        self.permission = Some(permission);
        self.publish_snapshot();
    }

    async fn transition(&mut self, next: SessionState) {
        let previous = self.state;
        self.state = next;
        self.publish_snapshot();

        if previous != next {
            log::debug!(
                "Session {}: {} -> {}",
                self.session_id,
                previous,
                next
            );
            self.publish(SessionEvent::new(
                SessionEventType::StateChanged,
                self.session_id,
                next,
            ))
            .await;
        }
    }

    async fn publish(&self, event: SessionEvent) {
        publish_event(self.lookup.notifications(), Event::Session(event)).await;
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            state: self.state,
            permission: self.permission,
            last_code: self.accepted_code.clone(),
            last_error: self.last_error.clone(),
            lookup_in_flight: self.lookup_in_flight,
            camera_active: self.camera_active,
        }
    }

    fn publish_snapshot(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}
