//! HTTP client for the product service

use crate::service::error::{ServiceError, ServiceResult};
use crate::service::normalize::{normalize_product, normalize_suggestions};
use crate::service::types::{BarcodeRequest, SuggestRequest, Suggestion};
use crate::store::api::ProductRecord;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const BARCODE_PATH: &str = "/api/barcode";
const SUGGEST_PATH: &str = "/api/suggest_alternatives";

/// Product lookups used by the scan controller and the CLI
///
/// Implementations must not retry: every failure is reported to the caller
/// for the attempt that caused it.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Look a barcode up; see [`normalize_product`] for the failure rules
    async fn lookup_barcode(&self, barcode: &str) -> ServiceResult<ProductRecord>;

    /// Eco-friendly alternatives for a product name
    async fn suggest_alternatives(&self, product_name: &str) -> ServiceResult<Vec<Suggestion>>;
}

/// Client for the product service's JSON API
pub struct HttpProductService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpProductService {
    /// Creates a client for `base_url` (scheme and host, no trailing slash)
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> ServiceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("ecoscan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("POST {}", url);

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            log::debug!("{} answered {}: {}", url, status, body_text);
            return Err(ServiceError::status(status));
        }

        response.json::<serde_json::Value>().await.map_err(|e| {
            if e.is_decode() {
                ServiceError::Api {
                    status: Some(status.as_u16()),
                    message: "Unexpected response from product service".to_string(),
                }
            } else {
                ServiceError::from(e)
            }
        })
    }
}

#[async_trait]
impl ProductService for HttpProductService {
    async fn lookup_barcode(&self, barcode: &str) -> ServiceResult<ProductRecord> {
        let body = self
            .post_json(BARCODE_PATH, &BarcodeRequest { barcode })
            .await?;
        let record = normalize_product(&body, barcode)?;
        log::info!(
            "Looked up {}: {} (score {:?})",
            record.barcode,
            record.display_name(),
            record.overall_sustainability_score
        );
        Ok(record)
    }

    async fn suggest_alternatives(&self, product_name: &str) -> ServiceResult<Vec<Suggestion>> {
        let body = self
            .post_json(SUGGEST_PATH, &SuggestRequest { product_name })
            .await?;
        let suggestions = normalize_suggestions(&body)?;
        log::debug!(
            "{} alternative(s) suggested for '{}'",
            suggestions.len(),
            product_name
        );
        Ok(suggestions)
    }
}
