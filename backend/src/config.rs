//! Configuration management for the GACP Certification Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with GACP_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT verification configuration
    pub jwt: JwtConfig,

    /// Workflow policy configuration
    pub workflow: WorkflowConfig,
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
    /// Secret shared with the authentication provider
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowConfig {
    /// Free revisions granted to new applications
    pub max_free_revisions: u32,

    /// Days until a requested payment falls due
    pub payment_due_days: u32,

    /// Score at or above which an assessment passes when no verdict is given
    pub assessment_pass_score: rust_decimal::Decimal,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("GACP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default(
                "workflow.max_free_revisions",
                i64::from(shared::DEFAULT_MAX_FREE_REVISIONS),
            )?
            .set_default("workflow.payment_due_days", 14)?
            .set_default(
                "workflow.assessment_pass_score",
                shared::DEFAULT_PASS_SCORE.to_string(),
            )?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (GACP_ prefix)
            .add_source(
                Environment::with_prefix("GACP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn revision_policy(&self) -> shared::RevisionPolicy {
        shared::RevisionPolicy::new(self.workflow.max_free_revisions)
    }
}
