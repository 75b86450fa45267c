//! Connection pool for the document store

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// `application_name` reported to Postgres, visible in `pg_stat_activity`.
pub const APPLICATION_NAME: &str = "docrel";

/// Longest wait for a free connection before the store call fails.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Parse `database_url` and tag the session with [`APPLICATION_NAME`].
pub fn connect_options(database_url: &str) -> Result<PgConnectOptions, sqlx::Error> {
    let options: PgConnectOptions = database_url.parse()?;
    Ok(options.application_name(APPLICATION_NAME))
}

/// Create a pool with the default size.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/docrel").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a pool holding at most `max_connections`.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(connect_options(database_url)?)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_carry_application_name() {
        let options = connect_options("postgres://ana@db.internal:6543/docrel").unwrap();
        assert_eq!(options.get_database(), Some("docrel"));
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_application_name(), Some(APPLICATION_NAME));
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(connect_options("not a url").is_err());
    }

    // Run with: DATABASE_URL=postgres://... cargo test -p docrel-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn session_reports_application_name() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");

        let (name,): (String,) = sqlx::query_as("SELECT current_setting('application_name')")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(name, APPLICATION_NAME);
    }
}
