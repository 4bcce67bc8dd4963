//! Application module

pub mod cli;
pub mod commands;
pub mod startup;
pub mod terminal;
