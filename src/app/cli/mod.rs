//! CLI module containing argument parsing, configuration and rendering

pub(crate) mod args;
pub(crate) mod config;
pub(crate) mod display;

pub mod api;

#[cfg(test)]
mod tests;
