//! CLI command implementations

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::auth::SystemClock;
use crate::http_server::{AppState, HttpServer};
use crate::observability::Logger;
use crate::shop::{ImportReport, Product, ProductCatalog};
use crate::store::{FileRecordStore, COLLECTIONS};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
        Command::ImportProducts { config, file } => import_products(&config, &file),
    }
}

/// Load config and apply its log level
fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    Ok(config)
}

/// Create one directory per collection under `data_dir`
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::already_initialized());
    }

    FileRecordStore::new(data_dir)
        .ensure_collections(&COLLECTIONS)
        .map_err(|e| CliError::config_error(format!("Failed to create data directory: {}", e)))?;

    Logger::info("DATA_DIR_INITIALIZED", &[("data_dir", config.data_dir.as_str())]);
    write_response(json!({"initialized": true, "data_dir": config.data_dir}))?;

    Ok(())
}

/// Run the HTTP API until Ctrl-C
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let data_dir = config.data_path();

    if !is_initialized(data_dir) {
        return Err(CliError::not_initialized());
    }

    let store = Arc::new(FileRecordStore::new(data_dir));
    let state = AppState::new(
        store,
        config.secret_hasher(),
        Arc::new(SystemClock),
        config.token_config(),
    );
    let server = HttpServer::with_state(config.http.clone(), Arc::new(state));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Create product records from a JSON array file
pub fn import_products(config_path: &Path, file: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let data_dir = config.data_path();

    if !is_initialized(data_dir) {
        return Err(CliError::not_initialized());
    }

    let report = import_file(data_dir, file)?;

    let created = report.created.len().to_string();
    let skipped = report.skipped.len().to_string();
    Logger::info(
        "PRODUCTS_IMPORTED",
        &[("created", created.as_str()), ("skipped", skipped.as_str())],
    );
    write_response(serde_json::to_value(&report)?)?;

    Ok(())
}

fn import_file(data_dir: &Path, file: &Path) -> CliResult<ImportReport> {
    let content = fs::read_to_string(file).map_err(|e| {
        CliError::import_failed(format!("Failed to read {}: {}", file.display(), e))
    })?;
    let products: Vec<Product> = serde_json::from_str(&content).map_err(|e| {
        CliError::import_failed(format!("Invalid products JSON in {}: {}", file.display(), e))
    })?;

    let store = Arc::new(FileRecordStore::new(data_dir));
    ProductCatalog::new(store)
        .import(&products)
        .map_err(|e| CliError::import_failed(e.to_string()))
}

/// Every collection directory exists
fn is_initialized(data_dir: &Path) -> bool {
    COLLECTIONS.iter().all(|c| data_dir.join(c).is_dir())
}
