//! Configuration management for Bookshelf server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Shortest signing secret accepted at startup, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest token lifetime accepted at startup (one year).
pub const MAX_TOKEN_TTL_MINUTES: u64 = 60 * 24 * 365;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Token signing settings, handed to the token service at construction.
/// The secret has no default value.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,
}

fn default_token_ttl_minutes() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // BOOKSHELF_AUTH__JWT_SECRET -> auth.jwt_secret
            .add_source(
                Environment::with_prefix("BOOKSHELF")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_minutes: u64) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_minutes,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "auth.jwt_secret is not set (use JWT_SECRET)".to_string(),
            ));
        }
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "auth.jwt_secret must be at least {} bytes",
                MIN_JWT_SECRET_LEN
            )));
        }
        if self.token_ttl_minutes == 0 {
            return Err(ConfigError::Message(
                "auth.token_ttl_minutes must be greater than zero".to_string(),
            ));
        }
        if self.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(ConfigError::Message(format!(
                "auth.token_ttl_minutes must be at most {}",
                MAX_TOKEN_TTL_MINUTES
            )));
        }
        Ok(())
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

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
