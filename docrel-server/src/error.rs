//! Startup errors for docrel-server
//!
//! Request-time failures are [`crate::http::ApiError`]; these are the ones that
//! stop the server from coming up.

use thiserror::Error;

use crate::config::ConfigError;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
