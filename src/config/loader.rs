//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
    let path = Path::new(path);

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: AppConfig =
        toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;

    validate_config(&config)?;

    info!(
        name = %config.bot.name,
        model = %config.oracle.model,
        bind = %config.server.bind_address,
        "Configuration loaded successfully"
    );

    Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
    anyhow::ensure!(!config.bot.name.is_empty(), "bot.name must not be empty");

    anyhow::ensure!(
        !config.server.bind_address.is_empty(),
        "server.bind_address must not be empty"
    );

    anyhow::ensure!(
        !config.oracle.base_url.is_empty(),
        "oracle.base_url must not be empty"
    );
    anyhow::ensure!(
        !config.oracle.base_url.ends_with('/'),
        "oracle.base_url must not carry a trailing slash, got {}",
        config.oracle.base_url
    );
    anyhow::ensure!(
        !config.oracle.model.is_empty(),
        "oracle.model must not be empty"
    );
    anyhow::ensure!(
        (0.0..=2.0).contains(&config.oracle.temperature),
        "oracle.temperature must be in [0, 2], got {}",
        config.oracle.temperature
    );
    anyhow::ensure!(
        config.oracle.timeout_ms > 0,
        "oracle.timeout_ms must be positive"
    );
    anyhow::ensure!(
        config.oracle.max_retries <= 10,
        "oracle.max_retries must be at most 10, got {}",
        config.oracle.max_retries
    );

    anyhow::ensure!(
        !config.persistence.data_dir.is_empty(),
        "persistence.data_dir must not be empty"
    );

    Ok(())
}
