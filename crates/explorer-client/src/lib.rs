//! # explorer-client
//!
//! Live side of OpenAPI Explorer:
//! - Loads endpoints from each base URL's OpenAPI document
//! - Sends request drafts and captures responses
//! - Keeps the last response per endpoint

pub mod error;
pub mod executor;
pub mod explorer;

pub use error::{ClientError, Result};
pub use executor::{RequestExecutor, ResponseRecord};
pub use explorer::Explorer;
