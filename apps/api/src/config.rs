//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                 | Default          |
//! |--------------------------|------------------|
//! | `PORT`                   | `3000`           |
//! | `SHOPLINE_DB_PATH`       | `./shopline.db`  |
//! | `DB_MAX_CONNECTIONS`     | `5`              |
//! | `SEED_DEFAULTS`          | `true`           |
//! | `CART_QUANTITY_OVERFLOW` | `reject`         |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use shopline_core::QuantityOverflow;
use shopline_db::DbConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP port, bound on all interfaces.
    pub port: u16,

    /// SQLite database file.
    pub database_path: PathBuf,

    /// Pool size.
    pub db_max_connections: u32,

    /// Fill empty tables with the default catalog at startup.
    pub seed_defaults: bool,

    /// What a repeated add does when a cart line would exceed 10.
    pub quantity_overflow: QuantityOverflow,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = ApiConfig {
            port: var("PORT", "3000")
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: PathBuf::from(var("SHOPLINE_DB_PATH", "./shopline.db")),

            db_max_connections: var("DB_MAX_CONNECTIONS", "5")
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            seed_defaults: parse_flag(&var("SEED_DEFAULTS", "true"))
                .ok_or_else(|| ConfigError::InvalidValue("SEED_DEFAULTS".to_string()))?,

            quantity_overflow: var("CART_QUANTITY_OVERFLOW", "reject")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CART_QUANTITY_OVERFLOW".to_string()))?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Socket address the server listens on.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Database configuration derived from this config.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.db_max_connections)
            .quantity_overflow(self.quantity_overflow)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
