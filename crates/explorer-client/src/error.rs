//! Error types for the explorer client

use thiserror::Error;

use explorer_core::ExplorerError;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}
