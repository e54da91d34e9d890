//! Crate-level error type for setup failures
//!
//! Per-request failures use [`StoreError`](crate::store::StoreError) and
//! [`ApiError`](crate::handlers::ApiError) instead.

use thiserror::Error;

/// Result type alias defaulting to the crate's error type
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while configuring or starting a service
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Tracing subscriber could not be installed
    #[error("Tracing error: {0}")]
    Tracing(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
