//! Endpoint extraction from OpenAPI documents

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{ParseError, ParseResult};
use crate::parser::Document;
use crate::resolver::SchemaResolver;
use crate::schema::SchemaNode;
use crate::types::*;

/// Turns a document's operations into self-contained endpoint descriptors
pub struct EndpointExtractor;

impl EndpointExtractor {
    /// Extract all endpoints from a document
    ///
    /// Never fails: a malformed document is logged and yields no endpoints.
    pub fn extract(document: &Document, base_url: &str) -> Vec<EndpointDescriptor> {
        match Self::try_extract(document, base_url) {
            Ok(endpoints) => {
                debug!("Extracted {} endpoints for {}", endpoints.len(), base_url);
                endpoints
            }
            Err(e) => {
                error!("Failed to extract endpoints for {}: {}", base_url, e);
                Vec::new()
            }
        }
    }

    /// Extract all endpoints, surfacing a malformed document as an error
    pub fn try_extract(document: &Document, base_url: &str) -> ParseResult<Vec<EndpointDescriptor>> {
        let spec: RawOpenApiSpec = serde_json::from_value(document.root().clone())
            .map_err(|e| ParseError::InvalidFormat(e.to_string()))?;
        let resolver = SchemaResolver::new(document.root());

        let mut endpoints = Vec::new();

        for (path, path_item) in &spec.paths {
            let Some(path_item) = path_item else {
                continue;
            };

            for method in HttpMethod::ALL {
                if let Some(operation) = path_item.operation(method) {
                    endpoints.push(Self::extract_endpoint(
                        path, method, operation, path_item, base_url, &resolver,
                    ));
                }
            }
        }

        Ok(endpoints)
    }

    /// Extract a single endpoint
    fn extract_endpoint(
        path: &str,
        method: HttpMethod,
        operation: &RawOperation,
        path_item: &RawPathItem,
        base_url: &str,
        resolver: &SchemaResolver,
    ) -> EndpointDescriptor {
        let request_body = operation
            .request_body
            .as_ref()
            .and_then(|raw| Self::dereference::<RawRequestBody>(raw, resolver, "request body"))
            .map(|body| Self::extract_request_body(&body, resolver));

        let responses = Self::extract_responses(&operation.responses, resolver);

        // Path-item parameters come first; a repeated name is not de-duplicated
        let mut parameters = ParameterSet::default();
        for raw in path_item.parameters.iter().chain(&operation.parameters) {
            if let Some(param) = Self::dereference::<RawParameter>(raw, resolver, "parameter")
                .and_then(|p| Self::convert_parameter(&p, resolver))
            {
                parameters.push(param);
            }
        }

        let name = operation
            .summary
            .clone()
            .unwrap_or_else(|| format!("{} {}", method.as_str(), path));

        let description = operation
            .description
            .clone()
            .or_else(|| operation.summary.clone())
            .unwrap_or_default();

        EndpointDescriptor {
            id: EndpointDescriptor::make_id(method, path),
            name,
            method,
            path: path.to_string(),
            description,
            parameters: (!parameters.is_empty()).then_some(parameters),
            request_body,
            responses,
            security: operation.security.clone(),
            base_url: base_url.to_string(),
        }
    }

    /// Follow `$ref`s on a component object and decode it
    fn dereference<T: DeserializeOwned>(
        raw: &Value,
        resolver: &SchemaResolver,
        what: &str,
    ) -> Option<T> {
        let target = match resolver.dereference(raw) {
            Ok(target) => target,
            Err(e) => {
                warn!("Skipping {}: {}", what, e);
                return None;
            }
        };

        match serde_json::from_value(target.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Skipping malformed {}: {}", what, e);
                None
            }
        }
    }

    /// Convert a raw parameter; unrecognized locations are dropped
    fn convert_parameter(param: &RawParameter, resolver: &SchemaResolver) -> Option<ParameterDescriptor> {
        let Some(location) = ParameterLocation::parse(&param.location) else {
            debug!("Dropping parameter {} with location {:?}", param.name, param.location);
            return None;
        };

        Some(ParameterDescriptor {
            name: param.name.clone(),
            location,
            required: param.required,
            description: param.description.clone(),
            schema: Self::resolve_raw_schema(param.schema.as_ref(), resolver),
            example: param.example.clone(),
            deprecated: param.deprecated,
        })
    }

    /// Extract request body information
    ///
    /// The first declared content type wins, in document order. A JSON
    /// content type is not preferred over an earlier one.
    fn extract_request_body(body: &RawRequestBody, resolver: &SchemaResolver) -> RequestBodyDescriptor {
        let (content_type, schema) = match body.content.first() {
            Some((content_type, media)) => (
                content_type.clone(),
                Self::resolve_raw_schema(media.schema.as_ref(), resolver),
            ),
            None => ("application/json".to_string(), None),
        };

        RequestBodyDescriptor {
            required: body.required,
            content_type,
            schema,
        }
    }

    /// Extract response information, first content type per status code
    fn extract_responses(
        responses: &IndexMap<String, Value>,
        resolver: &SchemaResolver,
    ) -> IndexMap<String, ResponseDescriptor> {
        responses
            .iter()
            .filter_map(|(status, raw)| {
                let response = Self::dereference::<RawResponse>(raw, resolver, "response")?;

                let schema = response
                    .content
                    .as_ref()
                    .and_then(|content| content.first())
                    .and_then(|(_, media)| Self::resolve_raw_schema(media.schema.as_ref(), resolver));

                Some((
                    status.clone(),
                    ResponseDescriptor {
                        description: response.description,
                        schema,
                        headers: response.headers,
                    },
                ))
            })
            .collect()
    }

    fn resolve_raw_schema(raw: Option<&Value>, resolver: &SchemaResolver) -> Option<SchemaNode> {
        let node = raw.and_then(SchemaNode::from_value);
        resolver.resolve(node.as_ref())
    }
}
