//! Scan session integration tests
//!
//! Drive a controller through the public API with a file-backed store and
//! check what a later process would read back.

mod common;

use common::{grocery_catalog, StubCamera};
use ecoscan::notifications::api::{
    new_notification_service, Event, EventFilter, SessionEventType, StoreEventType,
};
use ecoscan::scanner::api::{
    ControllerConfig, ErrorKind, LookupPipeline, PermissionState, ScanSessionController,
    SessionHandle, SessionState,
};
use ecoscan::store::api::{FileBackend, HistoryStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn spawn_controller(
    camera: StubCamera,
    data_dir: &Path,
    config: ControllerConfig,
) -> (SessionHandle, Arc<HistoryStore>) {
    let store = Arc::new(HistoryStore::open(FileBackend::new(data_dir)));
    let lookup = LookupPipeline::new(
        Arc::new(grocery_catalog()),
        store.clone(),
        new_notification_service(),
    );
    let (handle, _task) = ScanSessionController::new(camera, lookup, config).spawn();
    (handle, store)
}

async fn scan_once(handle: &SessionHandle, barcode: &str) {
    assert!(handle.start_session().await);
    let session_id = handle.snapshot().session_id;
    handle
        .wait_until(|s| s.state == SessionState::Scanning)
        .await
        .expect("controller should reach scanning");

    handle.on_decode_event(barcode).await;

    handle
        .wait_until(|s| {
            s.session_id == session_id && s.state == SessionState::Idle && !s.lookup_in_flight
        })
        .await
        .expect("lookup should complete");
}

#[tokio::test]
async fn test_scans_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let camera = StubCamera::new(PermissionState::Granted);

    {
        let (handle, store) =
            spawn_controller(camera.clone(), dir.path(), ControllerConfig::default());
        scan_once(&handle, "3017620422003").await;
        scan_once(&handle, "8000500310427").await;
        scan_once(&handle, "3017620422003").await;

        assert!(!camera.is_streaming());
        assert_eq!(store.persistence_failures(), 0);
    }

    // A new process opening the same data directory
    let reopened = HistoryStore::open(FileBackend::new(dir.path()));
    let history = reopened.scan_history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].product_name, "Organic lentils");

    let recent: Vec<String> = reopened
        .recent_products()
        .into_iter()
        .map(|p| p.barcode)
        .collect();
    assert_eq!(recent, vec!["3017620422003", "8000500310427"]);

    let analytics = reopened.compute_analytics();
    assert_eq!(analytics.total_scans, 3);
    assert_eq!(
        analytics
            .most_sustainable_product
            .map(|p| p.product_name)
            .as_deref(),
        Some("Organic lentils")
    );
    assert_eq!(analytics.ranked_products.len(), 2);

    println!("✓ History and recent products persist across store instances");
}

#[tokio::test]
async fn test_store_events_follow_a_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, _store) = spawn_controller(
        StubCamera::new(PermissionState::Granted),
        dir.path(),
        ControllerConfig::default(),
    );
    let mut events = handle.subscribe("test:store", EventFilter::StoreOnly).await;

    scan_once(&handle, "5449000000996").await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            Event::Store(store_event) => seen.push((store_event.event_type, store_event.size)),
            Event::Session(_) => panic!("store-only subscriber received a session event"),
        }
    }
    assert_eq!(
        seen,
        vec![
            (StoreEventType::HistoryAppended, Some(1)),
            (StoreEventType::RecentUpdated, Some(1)),
        ]
    );
}

#[tokio::test]
async fn test_denied_camera_fails_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let camera = StubCamera::new(PermissionState::Denied);
    let (handle, store) =
        spawn_controller(camera.clone(), dir.path(), ControllerConfig::default());
    let mut events = handle.subscribe("test:session", EventFilter::SessionOnly).await;

    assert!(handle.start_session().await);
    let snapshot = handle
        .wait_until(|s| s.state == SessionState::Error)
        .await
        .unwrap();

    assert_eq!(snapshot.permission, Some(PermissionState::Denied));
    let error = snapshot.last_error.expect("failure should be recorded");
    assert_eq!(error.kind(), ErrorKind::PermissionDenied);
    assert!(!camera.is_streaming());
    assert!(store.scan_history().is_empty());

    let mut failure = None;
    while let Some(event) = events.recv().await {
        if let Event::Session(session) = event {
            if session.event_type == SessionEventType::SessionFailed {
                failure = Some(session);
                break;
            }
        }
    }
    let failure = failure.unwrap();
    assert_eq!(failure.error, Some(ErrorKind::PermissionDenied));
    assert_eq!(
        failure.message.as_deref(),
        Some("Camera permission denied. Please allow camera access and try again.")
    );

    println!("✓ Denied permission ends in the error state");
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_session_can_restart() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, _store) = spawn_controller(
        StubCamera::new(PermissionState::Granted),
        dir.path(),
        ControllerConfig {
            scan_timeout: Duration::from_secs(5),
        },
    );

    assert!(handle.start_session().await);
    let snapshot = handle
        .wait_until(|s| s.state == SessionState::TimedOut)
        .await
        .unwrap();
    assert_eq!(
        snapshot.last_error.map(|e| e.message().to_string()).as_deref(),
        Some("Scan timeout - no barcode detected within 5 seconds")
    );

    scan_once(&handle, "8000500310427").await;
    assert_eq!(handle.snapshot().session_id, 2);
    assert_eq!(handle.snapshot().last_code.as_deref(), Some("8000500310427"));

    println!("✓ A timed-out session can be restarted");
}
