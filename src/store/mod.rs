//! History & Cache Store
//!
//! Persists the scan event history, the recently viewed products list and the
//! selected-product handoff through a string-keyed backend. Everything the
//! analytics screen shows is derived from the scan history on demand.

pub(crate) mod analytics;
pub(crate) mod backend;
pub(crate) mod error;
pub(crate) mod history;
pub(crate) mod types;

pub mod api;

#[cfg(test)]
mod tests;
