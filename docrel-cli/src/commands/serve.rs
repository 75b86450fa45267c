//! HTTP server command
//!
//! Flags override the environment, which overrides the defaults.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use docrel_server::db::DEFAULT_MAX_CONNECTIONS;
use docrel_server::{ServerConfig, StoreBackend};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to [default: 127.0.0.1:3030]
    #[arg(long, short = 'b', env = "DOCREL_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep documents in process memory, ignoring DATABASE_URL
    #[arg(long)]
    pub memory: bool,

    /// Postgres pool size
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

impl ServeArgs {
    /// Layer the flags over an environment-derived config.
    pub fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        config.cors_permissive |= self.cors_permissive;

        config.store = if self.memory {
            StoreBackend::Memory
        } else {
            match (self.database_url, config.store) {
                (Some(database_url), _) | (None, StoreBackend::Postgres { database_url, .. }) => {
                    StoreBackend::Postgres {
                        database_url,
                        max_connections: self.max_connections,
                    }
                }
                (None, StoreBackend::Memory) => StoreBackend::Memory,
            }
        };
        config
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.apply(ServerConfig::from_env().context("Invalid server environment")?);

    tracing::info!(
        addr = %config.bind_addr,
        store = config.store.name(),
        "Starting docrel server"
    );

    // Blocks until shutdown
    docrel_server::serve(config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServeArgs {
        ServeArgs::try_parse_from(std::iter::once("serve").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn memory_flag_wins_over_environment_database() {
        let env = ServerConfig {
            store: StoreBackend::Postgres {
                database_url: "postgres://env/db".into(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
            ..ServerConfig::default()
        };
        let config = parse(&["--memory"]).apply(env);
        assert_eq!(config.store, StoreBackend::Memory);
    }

    #[test]
    fn database_flag_sets_pool_size() {
        let config = parse(&[
            "--database-url",
            "postgres://cli/db",
            "--max-connections",
            "12",
            "--bind",
            "0.0.0.0:8080",
        ])
        .apply(ServerConfig::default());

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(
            config.store,
            StoreBackend::Postgres {
                database_url: "postgres://cli/db".into(),
                max_connections: 12,
            }
        );
    }

    #[test]
    fn environment_values_survive_without_flags() {
        let env = ServerConfig {
            cors_permissive: true,
            ..ServerConfig::default()
        };
        let config = parse(&[]).apply(env);
        assert!(config.cors_permissive);
        assert_eq!(config.store, StoreBackend::Memory);
    }
}
