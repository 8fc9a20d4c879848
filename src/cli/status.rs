//! Status CLI command.

#![allow(clippy::print_stdout)]

use crate::Result;
use crate::config::AsclepiusConfig;
use crate::storage::{ResultStore, SCHEMA_VERSION, SqliteResultStore};

/// Status command.
///
/// Reports what is in place without creating anything: the database is only
/// opened if it already exists.
///
/// # Errors
///
/// Returns an error if an existing database cannot be read.
pub fn cmd_status(config: &AsclepiusConfig) -> Result<()> {
    println!("Asclepius Status");
    println!("================");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    let data_status = if config.data_dir.exists() {
        "Configured"
    } else {
        "Will be created on first use"
    };
    println!("Data Directory: {data_status}");
    println!("  Path: {}", config.data_dir.display());

    let db_path = config.database_path();
    if db_path.exists() {
        let store = SqliteResultStore::open(&db_path)?;
        println!("History Database: Available");
        println!(
            "  Schema: v{} (supported: v{SCHEMA_VERSION})",
            store.schema_version()?
        );
        println!("  Saved results: {}", store.list_all()?.len());
    } else {
        println!("History Database: Not initialized");
    }
    println!("  Path: {}", db_path.display());

    let model_path = config.resolved_model_path();
    let model_status = if model_path.exists() {
        "Available"
    } else {
        "Not found"
    };
    let backend = if cfg!(feature = "onnx") {
        "ONNX (tract)"
    } else {
        "disabled (build without the onnx feature)"
    };
    println!("Classifier: {backend}");
    println!("  Model: {model_status}");
    println!("  Path: {}", model_path.display());

    let key_status = if config.news.api_key.is_empty() {
        "Not set"
    } else {
        "Configured"
    };
    println!("News API: {}", config.news.base_url);
    println!("  API key: {key_status}");

    println!();
    println!("Use 'asclepius config --show' to view full configuration");

    Ok(())
}
