//! Error types for the endpoint parser

use thiserror::Error;

/// Result type alias for parser operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parser error types
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to fetch OpenAPI document: {0}")]
    FetchError(String),

    #[error("Invalid OpenAPI document format: {0}")]
    InvalidFormat(String),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

/// Schema resolution error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Could not resolve schema reference: {0}")]
    MissingReference(String),

    #[error("Unsupported reference (only local '#/' pointers are followed): {0}")]
    InvalidReference(String),

    #[error("Reference target is not a schema object: {0}")]
    NotASchema(String),

    #[error("Cyclic schema: {pointer} is already being resolved via {}", chain.join(" -> "))]
    CyclicReference { pointer: String, chain: Vec<String> },
}
