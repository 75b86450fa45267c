//! Server configuration
//!
//! Loaded from environment variables:
//! - `DOCREL_BIND`: listen address (default: 127.0.0.1:3030)
//! - `DOCREL_CORS_PERMISSIVE`: `1`/`true`/`yes` allows any origin
//! - `DATABASE_URL`: Postgres connection string; absent means the in-memory store

use std::net::SocketAddr;

use crate::db::DEFAULT_MAX_CONNECTIONS;

/// Where documents are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local, lost on exit
    Memory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres { .. } => "postgres",
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Allow any CORS origin (default: false = localhost only)
    pub cors_permissive: bool,

    pub store: StoreBackend,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            store: StoreBackend::Memory,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address '{value}'")]
    InvalidBind { value: String },
}

impl ServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source (for testing)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("DOCREL_BIND") {
            config.bind_addr = value
                .parse()
                .map_err(|_| ConfigError::InvalidBind { value })?;
        }

        config.cors_permissive = lookup("DOCREL_CORS_PERMISSIVE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        if let Some(database_url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            config.store = StoreBackend::Postgres {
                database_url,
                max_connections: DEFAULT_MAX_CONNECTIONS,
            };
        }

        Ok(config)
    }
}
