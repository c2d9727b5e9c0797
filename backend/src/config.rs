//! Configuration management for the Stockbook backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with STOCKBOOK_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Log output format: "pretty" or "json"
    pub log_format: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT verification configuration
    pub jwt: JwtConfig,

    /// Media service used to release image references
    pub media: MediaConfig,

    /// Listing page sizes
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key used to verify company tokens (HS256)
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Base URL of the media service; release intents are only logged when unset
    pub base_url: Option<String>,

    /// Shared secret for signing release requests
    pub signing_secret: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    /// Default page size for inventory listings
    pub inventory_limit: u32,

    /// Default page size for sales listings
    pub sales_limit: u32,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKBOOK_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("log_format", "pretty")?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("media.signing_secret", "")?
            .set_default("media.timeout_secs", 10)?
            .set_default(
                "pagination.inventory_limit",
                shared::DEFAULT_INVENTORY_PAGE_LIMIT,
            )?
            .set_default("pagination.sales_limit", shared::DEFAULT_SALES_PAGE_LIMIT)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKBOOK_ prefix)
            .add_source(
                Environment::with_prefix("STOCKBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            inventory_limit: shared::DEFAULT_INVENTORY_PAGE_LIMIT,
            sales_limit: shared::DEFAULT_SALES_PAGE_LIMIT,
        }
    }
}
