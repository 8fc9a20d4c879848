//! Config CLI command.

#![allow(clippy::print_stdout)]
#![allow(clippy::needless_pass_by_value)]

use crate::Result;
use crate::config::AsclepiusConfig;

/// Config command.
///
/// # Errors
///
/// Never fails today; the signature matches the other commands.
#[allow(clippy::unnecessary_wraps)]
pub fn cmd_config(config: AsclepiusConfig, show: bool) -> Result<()> {
    if !show {
        println!("Use 'asclepius config --show' to view current configuration");
        return Ok(());
    }

    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("Data Directory: {}", config.data_dir.display());
    println!("Database: {}", config.database_path().display());
    println!();

    let classifier = &config.classifier;
    println!("Classifier:");
    println!("  Model: {}", config.resolved_model_path().display());
    println!("  Threshold: {:.2}", classifier.threshold);
    if classifier.max_results == 0 {
        println!("  Max Results: (unlimited)");
    } else {
        println!("  Max Results: {}", classifier.max_results);
    }
    println!("  Input Size: {0}x{0}", classifier.input_size);
    println!("  Labels: {}", classifier.labels.join(", "));
    println!();

    println!("News:");
    println!("  Base URL: {}", config.news.base_url);
    println!("  API Key: {}", mask_secret(&config.news.api_key));
    println!("  Timeout: {}ms", config.news.http.timeout_ms);
    println!("  Connect Timeout: {}ms", config.news.http.connect_timeout_ms);
    println!();

    let logging = &config.logging;
    println!("Logging:");
    println!(
        "  Format: {}",
        logging.format.as_deref().unwrap_or("(default)")
    );
    println!(
        "  Filter: {}",
        logging.filter.as_deref().unwrap_or("(default)")
    );
    println!(
        "  File: {}",
        logging
            .file
            .as_ref()
            .map_or_else(|| "(stderr)".to_string(), |p| p.display().to_string())
    );

    Ok(())
}

/// Shows only the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "(not set)".to_string();
    }
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{tail}")
}
