//! Application configuration loaded from environment variables.

use std::env;

use mealboard_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub sweeper: SweeperConfig,
}

/// Expiry sweeper configuration.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    pub enabled: bool,
    /// Cron expression; defaults to the top of every hour.
    pub schedule: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            sweeper: SweeperConfig {
                enabled: env::var("SWEEPER_ENABLED")
                    .map(|v| v != "false" && v != "0")
                    .unwrap_or(true),
                schedule: env::var("SWEEPER_SCHEDULE")
                    .unwrap_or_else(|_| "0 0 * * * *".to_string()),
            },
        }
    }
}
