//! Remote Product Service Client
//!
//! Stateless request/response wrapper around the product service's barcode
//! lookup and alternative-suggestion endpoints. Responses are normalized at
//! this boundary so the rest of the crate only sees canonical records.

pub(crate) mod client;
pub(crate) mod error;
pub(crate) mod normalize;
pub(crate) mod types;

pub mod api;

#[cfg(test)]
mod tests;
