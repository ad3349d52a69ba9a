//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

use crate::models::validate_locale;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Language used when a request does not name one (default: "en").
    pub default_language: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let default_language = env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string());
        validate_locale(&default_language).context("DEFAULT_LANGUAGE is not a valid locale")?;

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            default_language,
        })
    }
}
