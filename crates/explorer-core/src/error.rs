//! Error types for explorer-core

use thiserror::Error;

/// Result type alias for explorer operations
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Explorer error types
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Unknown base URL: {0}")]
    UnknownBaseUrl(String),

    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
