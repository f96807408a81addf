//! Configuration management for the Usagelog server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Record store connection settings.
///
/// `backend` selects the adapter: "http" talks to the remote table service,
/// "memory" runs against an empty in-process store (development only).
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: String,
    /// Base URL of the table service, e.g. "https://tables.example.org/v1"
    pub base_url: String,
    /// Name of the logbook document holding all tables
    pub document: String,
    /// Bearer token for the table service
    pub api_token: Option<String>,
    /// Rows per append request during bulk import
    pub append_batch_size: usize,
}

/// Names of the master tables inside the logbook document.
///
/// The company and equipment lists are probed against several candidate
/// titles because the document has historically carried variant spellings.
#[derive(Debug, Deserialize, Clone)]
pub struct MasterTablesConfig {
    pub users: String,
    pub equipment_candidates: Vec<String>,
    pub company_candidates: Vec<String>,
    pub equipment_info_candidates: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub tables: MasterTablesConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix USAGELOG_)
            .add_source(
                Environment::with_prefix("USAGELOG")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override store URL from STORE_URL env var if present
            .set_override_option("store.base_url", env::var("STORE_URL").ok())?
            // Override store token from STORE_TOKEN env var if present
            .set_override_option("store.api_token", env::var("STORE_TOKEN").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "http".to_string(),
            base_url: "http://localhost:9090/v1".to_string(),
            document: "equipment-logbook".to_string(),
            api_token: None,
            append_batch_size: 50,
        }
    }
}

impl Default for MasterTablesConfig {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            equipment_candidates: vec![
                "equipment".to_string(),
                "equipment list".to_string(),
                "equipment_list".to_string(),
            ],
            company_candidates: vec![
                "companies".to_string(),
                "company list".to_string(),
                "company_list".to_string(),
            ],
            equipment_info_candidates: vec![
                "equipment info".to_string(),
                "equipment_info".to_string(),
            ],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
