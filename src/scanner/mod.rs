//! Scan Session Controller
//!
//! Orchestrates one barcode acquisition session: camera permission and
//! stream lifecycle, duplicate suppression, the acquisition window, a single
//! product lookup per accepted code and write-through to the history store.
//!
//! The camera is a [`CameraDevice`](api::CameraDevice); the decoder pushes
//! [`DecodeAttempt`](api::DecodeAttempt)s into the controller; presentation
//! surfaces read [`SessionSnapshot`](api::SessionSnapshot)s and subscribe to
//! session events.

// Internal modules - all access should go through api module
pub(crate) mod camera;
pub(crate) mod controller;
pub(crate) mod error;
pub(crate) mod lookup;
pub(crate) mod startup;
pub(crate) mod types;

pub mod api;

#[cfg(test)]
mod tests;
