//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use hearts::session::SessionConfig;
use std::net::SocketAddr;

/// Default HTTP/WebSocket bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:6969";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address, metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Security configuration
    pub security: SecurityConfig,
    /// Game session configuration
    pub session: SessionConfig,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Ticket signing secret (required)
    pub ticket_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
    /// Ticket lifetime in seconds
    pub ticket_ttl_secs: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?.unwrap_or(default_bind()),
        };
        let metrics_bind = parse_env("METRICS_BIND")?;

        // Security configuration (REQUIRED)
        let ticket_secret =
            std::env::var("TICKET_SECRET").map_err(|_| ConfigError::MissingRequired {
                var: "TICKET_SECRET".to_string(),
                hint: "Generate with: openssl rand -hex 32".to_string(),
            })?;

        let password_pepper =
            std::env::var("PASSWORD_PEPPER").map_err(|_| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let security = SecurityConfig {
            ticket_secret,
            password_pepper,
            ticket_ttl_secs: parse_env("TICKET_TTL_SECS")?.unwrap_or(3600),
        };

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            inbox_capacity: defaults.inbox_capacity,
            tick_interval_ms: parse_env("SESSION_TICK_MS")?.unwrap_or(defaults.tick_interval_ms),
            abandon_timeout_secs: parse_env("SESSION_ABANDON_TIMEOUT_SECS")?
                .unwrap_or(defaults.abandon_timeout_secs),
        };

        let config = ServerConfig {
            bind,
            metrics_bind,
            security,
            session,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.ticket_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "TICKET_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.security.password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        if self.security.ticket_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                var: "TICKET_TTL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server address ({})", self.bind),
            });
        }

        self.session
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "SESSION_*".to_string(),
                reason,
            })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6969))
}

/// Parse an optional environment variable. Unset is `None`, unparsable is an
/// error.
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
