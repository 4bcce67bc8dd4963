//! Shared fakes for controller tests

use crate::core::time::MockTimeProvider;
use crate::notifications::api::{new_notification_service, Event, EventFilter, EventReceiver};
use crate::scanner::api::{
    CameraDevice, CameraError, ControllerConfig, LookupPipeline, PermissionState,
    ScanSessionController, SessionHandle, SessionSnapshot, SessionState,
};
use crate::service::api::{ProductService, ServiceError, ServiceResult, Suggestion};
use crate::store::api::{HistoryStore, MemoryBackend, ProductRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// 2024-03-10T12:00:00Z
pub const NOON_MARCH_10: i64 = 1_710_072_000_000;

struct CameraState {
    supported: bool,
    permission: Result<PermissionState, CameraError>,
    access: Result<(), CameraError>,
    access_hangs: bool,
    stream: Result<(), CameraError>,
    streaming: bool,
    access_requests: usize,
    stream_starts: usize,
}

/// Scriptable camera; clones share state so tests can inspect it
#[derive(Clone)]
pub struct FakeCamera {
    state: Arc<Mutex<CameraState>>,
}

impl FakeCamera {
    pub fn granted() -> Self {
        Self::with_permission(Ok(PermissionState::Granted))
    }

    pub fn with_permission(permission: Result<PermissionState, CameraError>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CameraState {
                supported: true,
                permission,
                access: Ok(()),
                access_hangs: false,
                stream: Ok(()),
                streaming: false,
                access_requests: 0,
                stream_starts: 0,
            })),
        }
    }

    pub fn unsupported(self) -> Self {
        self.state.lock().unwrap().supported = false;
        self
    }

    pub fn failing_access(self, reason: &str) -> Self {
        self.state.lock().unwrap().access = Err(CameraError::AccessDenied(reason.to_string()));
        self
    }

    /// Access requests never resolve, like an unanswered permission prompt
    pub fn unanswered_prompt() -> Self {
        let camera = Self::with_permission(Ok(PermissionState::Prompt));
        camera.state.lock().unwrap().access_hangs = true;
        camera
    }

    pub fn failing_stream(self, reason: &str) -> Self {
        self.state.lock().unwrap().stream = Err(CameraError::Unavailable(reason.to_string()));
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.state.lock().unwrap().streaming
    }

    pub fn access_requests(&self) -> usize {
        self.state.lock().unwrap().access_requests
    }

    pub fn stream_starts(&self) -> usize {
        self.state.lock().unwrap().stream_starts
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    fn is_supported(&self) -> bool {
        self.state.lock().unwrap().supported
    }

    async fn query_permission(&self) -> Result<PermissionState, CameraError> {
        self.state.lock().unwrap().permission.clone()
    }

    async fn request_access(&mut self) -> Result<(), CameraError> {
        let (hangs, access) = {
            let mut state = self.state.lock().unwrap();
            state.access_requests += 1;
            (state.access_hangs, state.access.clone())
        };
        if hangs {
            std::future::pending::<()>().await;
        }
        access
    }

    async fn start_stream(&mut self) -> Result<(), CameraError> {
        let mut state = self.state.lock().unwrap();
        state.stream_starts += 1;
        state.stream.clone()?;
        state.streaming = true;
        Ok(())
    }

    fn release(&mut self) {
        self.state.lock().unwrap().streaming = false;
    }
}

/// Product service answering from a table; unknown codes are not found
pub struct FakeService {
    products: HashMap<String, ProductRecord>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl FakeService {
    pub fn with_products(products: &[(&str, &str, Option<f64>)]) -> Self {
        let products = products
            .iter()
            .map(|(barcode, name, score)| {
                let mut record = ProductRecord::new(barcode);
                record.product_name = Some(name.to_string());
                record.overall_sustainability_score = *score;
                (barcode.to_string(), record)
            })
            .collect();

        Self {
            products,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold every lookup until the returned gate is notified
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductService for FakeService {
    async fn lookup_barcode(&self, barcode: &str) -> ServiceResult<ProductRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(barcode.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.products
            .get(barcode)
            .cloned()
            .ok_or_else(|| ServiceError::ProductNotFound {
                barcode: barcode.to_string(),
            })
    }

    async fn suggest_alternatives(&self, _product_name: &str) -> ServiceResult<Vec<Suggestion>> {
        Ok(Vec::new())
    }
}

pub struct Harness {
    pub handle: SessionHandle,
    pub camera: FakeCamera,
    pub service: Arc<FakeService>,
    pub store: Arc<HistoryStore>,
    pub backend: Arc<MemoryBackend>,
    pub events: EventReceiver,
    pub task: JoinHandle<()>,
}

pub async fn harness(camera: FakeCamera, service: FakeService) -> Harness {
    harness_with_config(camera, service, ControllerConfig::default()).await
}

pub async fn harness_with_config(
    camera: FakeCamera,
    service: FakeService,
    config: ControllerConfig,
) -> Harness {
    let backend = Arc::new(MemoryBackend::new());
    let store = Arc::new(HistoryStore::open(backend.clone()));
    let service = Arc::new(service);
    let lookup = LookupPipeline::new(service.clone(), store.clone(), new_notification_service())
        .with_clock(Arc::new(MockTimeProvider::at(NOON_MARCH_10)));

    let (handle, task) =
        ScanSessionController::new(camera.clone(), lookup, config).spawn();
    let events = handle.subscribe("test", EventFilter::All).await;

    Harness {
        handle,
        camera,
        service,
        store,
        backend,
        events,
        task,
    }
}

impl Harness {
    pub async fn start_scanning(&self) {
        assert!(self.handle.start_session().await);
        let snapshot = self
            .handle
            .wait_until(|s| !s.state.is_active() || s.state == SessionState::Scanning)
            .await
            .unwrap();
        assert_eq!(snapshot.state, SessionState::Scanning, "{:?}", snapshot);
    }

    pub async fn wait_for_state(&self, state: SessionState) -> SessionSnapshot {
        self.handle
            .wait_until(|s| s.state == state)
            .await
            .unwrap()
    }

    /// Everything published so far
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Let every runnable task finish its work; the paused clock only advances
/// once the runtime is idle
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
