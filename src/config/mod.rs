pub mod identity;

pub use identity::IdentityConfig;

use std::{env, net::SocketAddr};
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const MIN_BRIDGE_TOKEN_LENGTH: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub environment: String,
    /// Shared secret the authentication middleware presents on every call.
    pub bridge_token: Option<String>,
    pub identity: IdentityConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("bind_addr", &self.bind_addr)
            .field("environment", &self.environment)
            .field("bridge_token", &self.bridge_token.as_ref().map(|_| "[REDACTED]"))
            .field("identity", &self.identity)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                message: e.to_string(),
            })?;

        let bridge_token = env::var("BRIDGE_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        Ok(AppConfig {
            database_url,
            bind_addr,
            environment: current_environment(),
            bridge_token,
            identity: IdentityConfig::from_env(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Refuses to start a production deployment with a missing or placeholder bridge token.
    pub fn validate_production_config(&self) -> Result<(), ConfigError> {
        if !self.is_production() {
            if self.bridge_token.is_none() {
                warn!("BRIDGE_TOKEN not set; callback and user routes are disabled");
            }
            return Ok(());
        }

        let token = self
            .bridge_token
            .as_deref()
            .ok_or(ConfigError::Missing("BRIDGE_TOKEN"))?;

        if token.len() < MIN_BRIDGE_TOKEN_LENGTH {
            return Err(ConfigError::Invalid {
                key: "BRIDGE_TOKEN",
                message: format!(
                    "must be at least {} characters in production",
                    MIN_BRIDGE_TOKEN_LENGTH
                ),
            });
        }

        let lowered = token.to_ascii_lowercase();
        if lowered.contains("example") || lowered.contains("changeme") || lowered.contains("default")
        {
            return Err(ConfigError::Invalid {
                key: "BRIDGE_TOKEN",
                message: "appears to be a default value".to_string(),
            });
        }

        if self.identity.providers.is_empty() {
            return Err(ConfigError::Invalid {
                key: "OAUTH_PROVIDERS",
                message: "at least one provider is required".to_string(),
            });
        }

        Ok(())
    }
}

fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}
