//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                    | Default             |
//! |-----------------------------|---------------------|
//! | `SPARES_HTTP_HOST`          | `0.0.0.0`           |
//! | `SPARES_HTTP_PORT`          | `5000`              |
//! | `SPARES_DB_PATH`            | `./data/spares.db`  |
//! | `SPARES_DB_MAX_CONNECTIONS` | `5`                 |
//! | `SPARES_ADMIN_EMAIL`        | unset               |
//! | `SPARES_ADMIN_PASSWORD`     | unset               |
//! | `SPARES_CORS_ALLOW_ANY`     | `true`              |

use std::env;
use std::path::PathBuf;

/// Admin account created or reset at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub http_host: String,

    /// HTTP port
    pub http_port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Optional admin bootstrap; both variables or neither
    pub admin: Option<AdminBootstrap>,

    /// Allow any origin (the web client is served separately)
    pub cors_allow_any: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. `load` uses the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin = match (lookup("SPARES_ADMIN_EMAIL"), lookup("SPARES_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.trim().is_empty() => Some(AdminBootstrap {
                email: email.trim().to_string(),
                password,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingRequired("SPARES_ADMIN_PASSWORD".to_string()))
            }
            _ => return Err(ConfigError::MissingRequired("SPARES_ADMIN_EMAIL".to_string())),
        };

        Ok(ServerConfig {
            http_host: lookup("SPARES_HTTP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            http_port: lookup("SPARES_HTTP_PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SPARES_HTTP_PORT".to_string()))?,

            db_path: lookup("SPARES_DB_PATH")
                .unwrap_or_else(|| "./data/spares.db".to_string())
                .into(),

            db_max_connections: lookup("SPARES_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("SPARES_DB_MAX_CONNECTIONS".to_string()))?,

            admin,

            cors_allow_any: lookup("SPARES_CORS_ALLOW_ANY")
                .unwrap_or_else(|| "true".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SPARES_CORS_ALLOW_ANY".to_string()))?,
        })
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
