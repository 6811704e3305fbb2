//! # explorer-core
//!
//! Core state for OpenAPI Explorer:
//! - Endpoint store keyed by base URL, method and path
//! - Request drafts seeded from endpoint contracts
//! - URL assembly for outgoing test requests
//! - Read-only settings

pub mod draft;
pub mod error;
pub mod settings;
pub mod store;

pub use draft::{RequestBuilder, RequestDraft};
pub use error::{ExplorerError, Result};
pub use settings::{Settings, SettingsManager};
pub use store::{EndpointKey, EndpointStore};
