//! Public API for the product service client

pub use crate::service::client::{HttpProductService, ProductService, DEFAULT_REQUEST_TIMEOUT};
pub use crate::service::error::{ServiceError, ServiceResult};
pub use crate::service::normalize::{normalize_product, normalize_suggestions};
pub use crate::service::types::Suggestion;
