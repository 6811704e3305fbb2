//! Request drafts and URL assembly

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

use endpoint_parser::{default_scalar, sample_data, EndpointDescriptor, ParameterLocation};

/// Header seeded into every new draft
pub const DEFAULT_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

/// User-edited values for one outgoing request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    pub path_params: IndexMap<String, String>,
    pub query_params: IndexMap<String, String>,
    pub headers: IndexMap<String, String>,
    /// Raw body text
    pub body: String,
}

impl RequestDraft {
    /// Initial draft for an endpoint, with the default `Content-Type` header
    pub fn for_endpoint(endpoint: &EndpointDescriptor) -> Self {
        let mut headers = IndexMap::new();
        headers.insert(DEFAULT_CONTENT_TYPE.0.to_string(), DEFAULT_CONTENT_TYPE.1.to_string());
        Self::with_headers(endpoint, headers)
    }

    /// Initial draft for an endpoint, starting from the given headers
    ///
    /// Required path and query parameters get a default scalar from their
    /// schema, required header parameters get an empty value, and a required
    /// body with a schema gets pretty-printed sample JSON.
    pub fn with_headers(endpoint: &EndpointDescriptor, headers: IndexMap<String, String>) -> Self {
        let mut draft = Self {
            headers,
            ..Self::default()
        };

        for param in endpoint.parameters_at(ParameterLocation::Path) {
            if param.required {
                draft
                    .path_params
                    .insert(param.name.clone(), default_scalar(param.schema.as_ref()));
            }
        }

        for param in endpoint.parameters_at(ParameterLocation::Query) {
            if param.required {
                draft
                    .query_params
                    .insert(param.name.clone(), default_scalar(param.schema.as_ref()));
            }
        }

        for param in endpoint.parameters_at(ParameterLocation::Header) {
            if param.required {
                draft.headers.insert(param.name.clone(), String::new());
            }
        }

        if let Some(body) = &endpoint.request_body {
            if body.required && body.schema.is_some() {
                let sample = sample_data(body.schema.as_ref());
                draft.body = serde_json::to_string_pretty(&sample).unwrap_or_default();
            }
        }

        debug!("Initialized draft for {}", endpoint.id);
        draft
    }

    pub fn set_path_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.path_params.insert(name.into(), value.into());
    }

    pub fn set_query_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query_params.insert(name.into(), value.into());
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Drop a header; returns its previous value
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.shift_remove(name)
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }
}

/// Assembles concrete request URLs
pub struct RequestBuilder;

impl RequestBuilder {
    /// Build the URL for an endpoint from a base URL and a draft
    ///
    /// Each path parameter replaces only the first `{name}` occurrence; a
    /// template repeating a placeholder keeps the later ones. Query
    /// parameters with empty values are left out, and no `?` is added when
    /// none remain.
    pub fn build_url(base_url: &str, endpoint: &EndpointDescriptor, draft: &RequestDraft) -> String {
        let mut url = format!("{}{}", base_url, endpoint.path);

        for (name, value) in &draft.path_params {
            url = url.replacen(&format!("{{{}}}", name), &urlencoding::encode(value), 1);
        }

        let query: Vec<String> = draft
            .query_params
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| format!("{}={}", urlencoding::encode(name), urlencoding::encode(value)))
            .collect();

        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }

        url
    }

    /// `{name}` placeholders still present in a built URL
    pub fn unfilled_placeholders(url: &str) -> Vec<String> {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER
            .get_or_init(|| Regex::new(r"\{([^{}/?&]+)\}").expect("placeholder pattern is valid"));

        re.captures_iter(url).map(|caps| caps[1].to_string()).collect()
    }
}
