//! Configuration management for the purchase launch server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with LAUNCH_ prefix

use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{RowDefaults, DEFAULT_CONDITION, DEFAULT_LOCATION, DEFAULT_WARRANTY};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Launch draft storage
    pub drafts: DraftsConfig,

    /// Values used when a purchase snapshot leaves a field blank
    pub defaults: DefaultsConfig,
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
    /// Secret key used to verify operator tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DraftsConfig {
    /// Directory holding one JSON draft per purchase order
    pub directory: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    pub condition: String,
    pub warranty: String,
    pub location: String,
}

impl From<&DefaultsConfig> for RowDefaults {
    fn from(defaults: &DefaultsConfig) -> Self {
        RowDefaults {
            condition: defaults.condition.clone(),
            warranty: defaults.warranty.clone(),
            location: defaults.location.clone(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("LAUNCH_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("drafts.directory", "data/drafts")?
            .set_default("defaults.condition", DEFAULT_CONDITION)?
            .set_default("defaults.warranty", DEFAULT_WARRANTY)?
            .set_default("defaults.location", DEFAULT_LOCATION)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (LAUNCH_ prefix)
            .add_source(
                Environment::with_prefix("LAUNCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn row_defaults(&self) -> RowDefaults {
        RowDefaults::from(&self.defaults)
    }
}
