//! Common test utilities and helpers
//!
//! Fakes built only on the public API so integration tests exercise the
//! crate the way an embedding front end would.

#![allow(dead_code)]

use async_trait::async_trait;
use ecoscan::scanner::api::{CameraDevice, CameraError, PermissionState};
use ecoscan::service::api::{ProductService, ServiceError, ServiceResult, Suggestion};
use ecoscan::store::api::ProductRecord;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Camera with a fixed permission answer
#[derive(Clone)]
pub struct StubCamera {
    permission: PermissionState,
    streaming: Arc<AtomicBool>,
}

impl StubCamera {
    pub fn new(permission: PermissionState) -> Self {
        Self {
            permission,
            streaming: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraDevice for StubCamera {
    fn is_supported(&self) -> bool {
        true
    }

    async fn query_permission(&self) -> Result<PermissionState, CameraError> {
        Ok(self.permission)
    }

    async fn request_access(&mut self) -> Result<(), CameraError> {
        match self.permission {
            PermissionState::Denied => Err(CameraError::AccessDenied("NotAllowedError".to_string())),
            _ => Ok(()),
        }
    }

    async fn start_stream(&mut self) -> Result<(), CameraError> {
        self.streaming.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) {
        self.streaming.store(false, Ordering::SeqCst);
    }
}

/// Product service answering from a fixed catalogue
pub struct CatalogService {
    products: HashMap<String, ProductRecord>,
}

impl CatalogService {
    pub fn new(entries: &[(&str, &str, f64)]) -> Self {
        let products = entries
            .iter()
            .map(|(barcode, name, score)| {
                let mut record = ProductRecord::new(barcode);
                record.product_name = Some(name.to_string());
                record.overall_sustainability_score = Some(*score);
                record.recyclable = true;
                (barcode.to_string(), record)
            })
            .collect();
        Self { products }
    }
}

#[async_trait]
impl ProductService for CatalogService {
    async fn lookup_barcode(&self, barcode: &str) -> ServiceResult<ProductRecord> {
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

pub fn grocery_catalog() -> CatalogService {
    CatalogService::new(&[
        ("3017620422003", "Hazelnut spread", 41.0),
        ("5449000000996", "Cola", 12.0),
        ("8000500310427", "Organic lentils", 88.0),
    ])
}
