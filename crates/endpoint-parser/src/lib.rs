//! # endpoint-parser
//!
//! OpenAPI 3.x endpoint extraction for OpenAPI Explorer.
//! Resolves schema references and turns every operation of a document into a
//! self-contained endpoint descriptor, with sample values for pre-filling
//! requests.

mod types;
mod schema;
mod resolver;
mod extractor;
mod parser;
mod error;
pub mod sample;

pub use types::*;
pub use schema::{Schema, SchemaNode, SchemaType};
pub use resolver::SchemaResolver;
pub use extractor::EndpointExtractor;
pub use parser::{Document, OpenApiParser, DEFAULT_SPEC_PATH};
pub use sample::{default_scalar, sample_data, sample_value};
pub use error::{ParseError, ParseResult, ResolveError};
