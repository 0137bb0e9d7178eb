//! CLI module for orderdesk
//!
//! Provides command-line interface for:
//! - init: Create the record directories
//! - serve: Run the HTTP API
//! - import-products: Seed the product catalog

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{import_products, init, run, run_command, serve};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
