//! Configuration management for the Bibliotheca server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use validator::Validate;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// When set, logs are also written to daily rolling files in this directory
    pub directory: Option<String>,
}

/// Lending rules enforced by the coordinator
#[derive(Debug, Deserialize, Clone, Validate)]
#[serde(default)]
pub struct LendingConfig {
    /// Maximum number of unreturned borrows per user
    #[validate(range(min = 1, message = "max_active_borrows must be at least 1"))]
    pub max_active_borrows: usize,
    /// Maximum number of reservation queues a user may wait in
    #[validate(range(min = 1, message = "max_queue_memberships must be at least 1"))]
    pub max_queue_memberships: usize,
    /// Borrow duration applied when a direct borrow does not specify one
    #[validate(range(min = 1, max = 365, message = "default_borrow_days must be between 1 and 365"))]
    pub default_borrow_days: i64,
    /// Borrow duration applied to copies assigned by the auto-borrow sweep
    #[validate(range(min = 1, max = 365, message = "auto_borrow_days must be between 1 and 365"))]
    pub auto_borrow_days: i64,
    /// Allow joining a queue while the book still has copies on the shelf
    pub queue_when_available: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmailConfig {
    /// Deliver notifications by mail; when false they are only logged
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub smtp_from_name: Option<String>,
    pub smtp_use_tls: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub lending: LendingConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // BIBLIOTHECA_LENDING__MAX_ACTIVE_BORROWS=5 style overrides
            .add_source(
                Environment::with_prefix("BIBLIOTHECA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("email.smtp_password", env::var("SMTP_PASSWORD").ok())?
            .build()?;

        config.try_deserialize::<Self>()?.validated()
    }

    /// Reject settings the lending engine cannot work with
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.lending
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid lending settings: {}", e)))?;
        Ok(self)
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
            directory: None,
        }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            max_active_borrows: 3,
            max_queue_memberships: 3,
            default_borrow_days: 14,
            auto_borrow_days: 14,
            queue_when_available: false,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "noreply@bibliotheca.local".to_string(),
            smtp_from_name: Some("Bibliotheca".to_string()),
            smtp_use_tls: true,
        }
    }
}
