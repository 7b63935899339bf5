//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml`. Endpoint URLs,
//! model names, and storage paths are externalized here — nothing is
//! hardcoded in the domain layer. The oracle API key stays in the
//! environment, never in the file.

pub mod loader;

use serde::Deserialize;

/// Top-level service configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the service begins accepting requests.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Service identity and metadata.
    pub bot: BotConfig,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Inference endpoint settings.
    pub oracle: OracleConfig,
    /// Persistence settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Human-readable instance name; doubles as the ledger identity.
    pub name: String,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// API bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Inference endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// OpenAI-compatible API base URL (no trailing slash).
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature; keep low for stable structured output.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum retries on transient errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Directory for the ledger state files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

// Default value functions for serde

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_data_dir() -> String {
    "data".to_string()
}
