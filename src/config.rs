//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(dead_code)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Render/Docker
            port: 3000,
        }
    }
}

/// Which card store backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Card store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Required when `backend` is Postgres
    pub database_url: Option<String>,
    pub max_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            database_url: None,
            max_pool_size: 10,
        }
    }
}

/// CORS configuration
///
/// An empty origin list means wide open; the source variants disagreed on
/// their allow-lists, so both become explicit configuration here.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "PUT".to_string(),
                "PATCH".to_string(),
                "DELETE".to_string(),
            ],
        }
    }
}

/// Card body schema configuration
///
/// The list of field names every card body must carry. Empty by default,
/// which accepts arbitrary JSON objects the way the source service does.
#[derive(Debug, Clone, Default)]
pub struct SchemaConfig {
    pub required_fields: Vec<String>,
}

/// CSV sidecar configuration
#[derive(Debug, Clone)]
pub struct CsvConfig {
    pub path: PathBuf,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("students5.csv"),
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub cors: CorsConfig,
    pub schema: SchemaConfig,
    pub csv: CsvConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        let server = ServerConfig {
            host: std::env::var("HOST")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        let backend = match std::env::var("STORE_BACKEND").ok().as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue(format!(
                    "STORE_BACKEND must be 'postgres' or 'memory', got '{}'",
                    other
                )))
            }
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres {
            let url = database_url
                .as_deref()
                .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
            // Fail fast on garbage before the pool bootstrap sees it
            url::Url::parse(url).map_err(|_| {
                ConfigError::InvalidValue(
                    "Invalid DATABASE_URL format (expected postgresql://...)".to_string(),
                )
            })?;
        }

        let store = StoreConfig {
            backend,
            database_url,
            max_pool_size: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        };

        let cors = CorsConfig {
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|s| parse_list(&s))
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
            allowed_methods: std::env::var("ALLOWED_METHODS")
                .ok()
                .map(|s| parse_list(&s))
                .unwrap_or_else(|| CorsConfig::default().allowed_methods),
        };

        let schema = SchemaConfig {
            required_fields: std::env::var("CARD_REQUIRED_FIELDS")
                .ok()
                .map(|s| parse_list(&s))
                .unwrap_or_default(),
        };

        let csv = CsvConfig {
            path: std::env::var("STUDENTS_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| CsvConfig::default().path),
        };

        Ok(Self {
            server,
            store,
            cors,
            schema,
            csv,
        })
    }
}

/// Split a comma-separated environment value, dropping empty entries
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
