//! Work-time ledger CLI library.
//!
//! This crate provides the command-line interface for the ledger.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
