//! Type definitions for endpoint descriptors and raw OpenAPI documents

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::SchemaNode;

/// HTTP methods the explorer recognizes, in extraction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Fixed order in which methods of a path item are visited
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Lower-case form, as used for OpenAPI path item keys and endpoint ids
    pub fn as_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }

    /// Whether a request body may be sent with this method
    pub fn allows_body(&self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Head)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameter location in HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }
}

/// A parameter for an endpoint, with its schema resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Where the parameter is located
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Resolved schema
    #[serde(default)]
    pub schema: Option<SchemaNode>,
    /// Example value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Whether the parameter is deprecated
    #[serde(default)]
    pub deprecated: bool,
}

/// Parameters grouped by location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub path: Vec<ParameterDescriptor>,
    pub query: Vec<ParameterDescriptor>,
    pub header: Vec<ParameterDescriptor>,
    pub cookie: Vec<ParameterDescriptor>,
}

impl ParameterSet {
    /// Append a parameter to the group matching its location
    pub fn push(&mut self, param: ParameterDescriptor) {
        match param.location {
            ParameterLocation::Path => self.path.push(param),
            ParameterLocation::Query => self.query.push(param),
            ParameterLocation::Header => self.header.push(param),
            ParameterLocation::Cookie => self.cookie.push(param),
        }
    }

    /// Parameters declared at one location
    pub fn at(&self, location: ParameterLocation) -> &[ParameterDescriptor] {
        match location {
            ParameterLocation::Path => &self.path,
            ParameterLocation::Query => &self.query,
            ParameterLocation::Header => &self.header,
            ParameterLocation::Cookie => &self.cookie,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
            && self.query.is_empty()
            && self.header.is_empty()
            && self.cookie.is_empty()
    }

    /// All parameters, path first, then query, header and cookie
    pub fn iter(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.path
            .iter()
            .chain(&self.query)
            .chain(&self.header)
            .chain(&self.cookie)
    }
}

/// Request body of an endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBodyDescriptor {
    /// Whether the body is required
    pub required: bool,
    /// First declared content type (e.g., "application/json")
    pub content_type: String,
    /// Resolved schema of that content type
    pub schema: Option<SchemaNode>,
}

/// One declared response of an endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    /// Response description
    #[serde(default)]
    pub description: Option<String>,
    /// Resolved schema of the first declared content type
    #[serde(default)]
    pub schema: Option<SchemaNode>,
    /// Response headers, as declared (not resolved)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, Value>>,
}

/// A normalized, fully resolved endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    /// `"<lowercase-method>-<path>"`, unique within one document
    pub id: String,
    /// Operation summary, or `"<METHOD> <path>"`
    pub name: String,
    /// HTTP method
    pub method: HttpMethod,
    /// URL path template (e.g., "/items/{id}")
    pub path: String,
    /// Operation description, falling back to the summary
    pub description: String,
    /// Parameters grouped by location; `None` when there are none at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterSet>,
    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyDescriptor>,
    /// Responses keyed by status code, in declaration order
    #[serde(default)]
    pub responses: IndexMap<String, ResponseDescriptor>,
    /// Security requirement objects of the operation, carried through verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<Value>>,
    /// Base URL the document was fetched from
    pub base_url: String,
}

impl EndpointDescriptor {
    /// Build the endpoint id for a method and path
    pub fn make_id(method: HttpMethod, path: &str) -> String {
        format!("{}-{}", method.as_key(), path)
    }

    /// Parameters at one location (empty when none are declared)
    pub fn parameters_at(&self, location: ParameterLocation) -> &[ParameterDescriptor] {
        self.parameters
            .as_ref()
            .map(|p| p.at(location))
            .unwrap_or(&[])
    }
}

// --- Raw OpenAPI 3.x structures for parsing ---

/// Raw OpenAPI document structure
///
/// Only the path table is decoded; `openapi` and `info` are read from the
/// raw tree where needed, so their shape never blocks extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOpenApiSpec {
    #[serde(default)]
    pub paths: IndexMap<String, Option<RawPathItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPathItem {
    pub get: Option<RawOperation>,
    pub post: Option<RawOperation>,
    pub put: Option<RawOperation>,
    pub delete: Option<RawOperation>,
    pub patch: Option<RawOperation>,
    pub options: Option<RawOperation>,
    pub head: Option<RawOperation>,
    /// Parameter objects or `$ref`s to them
    #[serde(default)]
    pub parameters: Vec<Value>,
}

impl RawPathItem {
    /// The operation declared for a method, if any
    pub fn operation(&self, method: HttpMethod) -> Option<&RawOperation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Parameter objects or `$ref`s to them
    #[serde(default)]
    pub parameters: Vec<Value>,
    /// Request body object or a `$ref` to one
    pub request_body: Option<Value>,
    /// Response objects (or `$ref`s) keyed by status code
    #[serde(default)]
    pub responses: IndexMap<String, Value>,
    pub security: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "in", default)]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<Value>,
    pub example: Option<Value>,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, RawMediaType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMediaType {
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawResponse {
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<IndexMap<String, RawMediaType>>,
    pub headers: Option<IndexMap<String, Value>>,
}
