//! CLI module for RateDesk

pub mod app;
pub mod commands;

pub use commands::{Cli, Commands};
