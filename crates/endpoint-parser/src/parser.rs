//! OpenAPI document loading

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{ParseError, ParseResult};
use crate::extractor::EndpointExtractor;
use crate::types::EndpointDescriptor;

/// Default location of the document relative to a base URL
pub const DEFAULT_SPEC_PATH: &str = "/openapi.json";

/// A fetched OpenAPI document
///
/// Keeps the raw JSON tree so `$ref` pointers can address any position.
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Wrap a raw JSON tree
    ///
    /// The shape is not validated beyond being an object; an explicit
    /// non-3.x `openapi` version (or a Swagger 2.0 `swagger` key) is rejected.
    pub fn from_value(root: Value) -> ParseResult<Self> {
        let obj = root
            .as_object()
            .ok_or_else(|| ParseError::InvalidFormat("document root is not an object".to_string()))?;

        if let Some(swagger) = obj.get("swagger").and_then(Value::as_str) {
            return Err(ParseError::UnsupportedVersion(format!("swagger {}", swagger)));
        }

        if let Some(version) = obj.get("openapi").and_then(Value::as_str) {
            if !version.starts_with("3.") {
                return Err(ParseError::UnsupportedVersion(version.to_string()));
            }
        }

        Ok(Self { root })
    }

    /// Raw document root
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// `info.title`, if declared
    pub fn title(&self) -> Option<&str> {
        self.root.pointer("/info/title").and_then(Value::as_str)
    }

    /// `info.version`, if declared
    pub fn version(&self) -> Option<&str> {
        self.root.pointer("/info/version").and_then(Value::as_str)
    }

    /// Extract endpoint descriptors for this document
    pub fn endpoints(&self, base_url: &str) -> Vec<EndpointDescriptor> {
        EndpointExtractor::extract(self, base_url)
    }
}

/// OpenAPI 3.x document parser
pub struct OpenApiParser;

impl OpenApiParser {
    /// Parse a document from a string (auto-detects JSON/YAML)
    pub fn parse(content: &str) -> ParseResult<Document> {
        if content.trim_start().starts_with('{') {
            Self::parse_json(content)
        } else {
            Self::parse_yaml(content)
        }
    }

    /// Parse a document from JSON
    pub fn parse_json(content: &str) -> ParseResult<Document> {
        let root: Value = serde_json::from_str(content)?;
        Document::from_value(root)
    }

    /// Parse a document from YAML
    pub fn parse_yaml(content: &str) -> ParseResult<Document> {
        let root: Value = serde_yaml::from_str(content)?;
        Document::from_value(root)
    }

    /// Build the document URL for a base URL
    pub fn document_url(base_url: &str, spec_path: &str) -> String {
        format!("{}{}", base_url, spec_path)
    }

    /// Fetch and parse a document from a URL
    pub async fn fetch_and_parse(client: &Client, url: &str) -> ParseResult<Document> {
        info!("Fetching OpenAPI document from: {}", url);

        let response = client
            .get(url)
            .header("Accept", "application/json, application/yaml, text/yaml")
            .send()
            .await
            .map_err(|e| ParseError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ParseError::HttpError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let content = response
            .text()
            .await
            .map_err(|e| ParseError::FetchError(e.to_string()))?;

        // Parse based on content type or file extension
        let document = if content_type.contains("yaml") || url.ends_with(".yaml") || url.ends_with(".yml") {
            Self::parse_yaml(&content)?
        } else {
            Self::parse(&content)?
        };

        debug!(
            "Fetched {} ({})",
            document.title().unwrap_or("untitled"),
            document.version().unwrap_or("unversioned")
        );

        Ok(document)
    }

    /// Fetch the document served under a base URL and extract its endpoints
    ///
    /// Never fails: an unreachable document, a non-2xx status or an
    /// unparseable body is logged and yields no endpoints.
    pub async fn fetch_endpoints(
        client: &Client,
        base_url: &str,
        spec_path: &str,
    ) -> Vec<EndpointDescriptor> {
        let url = Self::document_url(base_url, spec_path);

        match Self::fetch_and_parse(client, &url).await {
            Ok(document) => document.endpoints(base_url),
            Err(e) => {
                error!("Failed to fetch endpoints from {}: {}", url, e);
                Vec::new()
            }
        }
    }
}
