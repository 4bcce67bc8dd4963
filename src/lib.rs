pub mod app;
pub mod core;
pub mod notifications;
pub mod scanner;
pub mod service;
pub mod store;
