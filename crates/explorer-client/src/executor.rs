//! Execute test requests against a live API

use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Request};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use endpoint_parser::{EndpointDescriptor, HttpMethod};
use explorer_core::{RequestBuilder, RequestDraft};

use crate::error::Result;

/// Outcome of one test request
///
/// Failures before a response arrives are recorded with status `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status: u16,
    pub status_text: String,
    pub headers: IndexMap<String, String>,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseRecord {
    /// Record for a request that produced no usable response
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            status_text: "Error".to_string(),
            headers: IndexMap::new(),
            data: Value::Null,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Sends drafts as HTTP requests
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
}

impl RequestExecutor {
    /// Create an executor with an optional request timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Create an executor sharing an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Build the outgoing request for an endpoint
    ///
    /// The method always comes from the endpoint. The body is attached only
    /// for methods other than GET and HEAD, and only when it is non-empty.
    pub fn build_request(
        &self,
        endpoint: &EndpointDescriptor,
        base_url: &str,
        draft: &RequestDraft,
    ) -> std::result::Result<Request, String> {
        let url = RequestBuilder::build_url(base_url, endpoint, draft);

        let unfilled = RequestBuilder::unfilled_placeholders(&url);
        if !unfilled.is_empty() {
            warn!("Sending {} with unfilled path parameters: {:?}", url, unfilled);
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &draft.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| format!("Invalid header name '{}': {}", name, e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| format!("Invalid value for header '{}': {}", name, e))?;
            headers.insert(name, value);
        }

        let mut request = self
            .client
            .request(to_reqwest_method(endpoint.method), &url)
            .headers(headers);

        if endpoint.method.allows_body() && !draft.body.is_empty() {
            request = request.body(draft.body.clone());
        }

        request.build().map_err(|e| e.to_string())
    }

    /// Send a draft and capture the response
    ///
    /// Never fails: transport errors, invalid input and unparseable JSON all
    /// come back as a failure record.
    pub async fn execute(
        &self,
        endpoint: &EndpointDescriptor,
        base_url: &str,
        draft: &RequestDraft,
    ) -> ResponseRecord {
        let request = match self.build_request(endpoint, base_url, draft) {
            Ok(request) => request,
            Err(e) => {
                warn!("Could not build request for {}: {}", endpoint.id, e);
                return ResponseRecord::failure(e);
            }
        };

        info!("Executing {} {}", request.method(), request.url());

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request for {} failed: {}", endpoint.id, e);
                return ResponseRecord::failure(e.to_string());
            }
        };

        let status = response.status();
        let headers = collect_headers(response.headers());
        let is_json = headers
            .get(CONTENT_TYPE.as_str())
            .is_some_and(|value| value.contains("application/json"));

        let data = if is_json {
            match response.json::<Value>().await {
                Ok(data) => data,
                Err(e) => {
                    warn!("Response for {} is not valid JSON: {}", endpoint.id, e);
                    return ResponseRecord::failure(e.to_string());
                }
            }
        } else {
            match response.text().await {
                Ok(text) => Value::String(text),
                Err(e) => return ResponseRecord::failure(e.to_string()),
            }
        };

        debug!("{} answered {}", endpoint.id, status);

        ResponseRecord {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            data,
            error: None,
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Head => Method::HEAD,
    }
}

/// Flatten response headers; repeated names are joined with ", "
fn collect_headers(headers: &HeaderMap) -> IndexMap<String, String> {
    let mut collected: IndexMap<String, String> = IndexMap::new();

    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(method: HttpMethod, path: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            id: EndpointDescriptor::make_id(method, path),
            name: path.to_string(),
            method,
            path: path.to_string(),
            description: String::new(),
            parameters: None,
            request_body: None,
            responses: IndexMap::new(),
            security: None,
            base_url: "http://localhost:8001".to_string(),
        }
    }

    fn executor() -> RequestExecutor {
        RequestExecutor::with_client(Client::new())
    }

    #[test]
    fn test_get_never_carries_a_body() {
        let mut draft = RequestDraft::default();
        draft.set_body("{\"a\": 1}");

        let request = executor()
            .build_request(&endpoint(HttpMethod::Get, "/items"), "http://localhost:8001", &draft)
            .unwrap();

        assert_eq!(request.method(), Method::GET);
        assert!(request.body().is_none());
    }

    #[test]
    fn test_post_carries_body_and_headers() {
        let mut draft = RequestDraft::for_endpoint(&endpoint(HttpMethod::Post, "/items"));
        draft.set_body("{\"a\": 1}");
        draft.set_header("X-Trace", "abc");

        let request = executor()
            .build_request(&endpoint(HttpMethod::Post, "/items"), "http://localhost:8001", &draft)
            .unwrap();

        assert_eq!(request.url().as_str(), "http://localhost:8001/items");
        assert_eq!(request.body().and_then(|b| b.as_bytes()), Some(&b"{\"a\": 1}"[..]));
        assert_eq!(request.headers()["content-type"], "application/json");
        assert_eq!(request.headers()["x-trace"], "abc");
    }

    #[test]
    fn test_empty_body_is_not_sent() {
        let draft = RequestDraft::default();

        let request = executor()
            .build_request(&endpoint(HttpMethod::Put, "/items"), "http://localhost:8001", &draft)
            .unwrap();

        assert!(request.body().is_none());
    }

    #[test]
    fn test_invalid_header_name_is_rejected() {
        let mut draft = RequestDraft::default();
        draft.set_header("bad header", "x");

        let err = executor()
            .build_request(&endpoint(HttpMethod::Get, "/items"), "http://localhost:8001", &draft)
            .unwrap_err();
        assert!(err.contains("bad header"));
    }

    #[tokio::test]
    async fn test_invalid_url_becomes_failure_record() {
        let record = executor()
            .execute(&endpoint(HttpMethod::Get, "/items"), "not a url", &RequestDraft::default())
            .await;

        assert_eq!(record.status, 0);
        assert_eq!(record.status_text, "Error");
        assert!(record.headers.is_empty());
        assert_eq!(record.data, Value::Null);
        assert!(record.is_error());
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert("x-one", HeaderValue::from_static("1"));

        let collected = collect_headers(&headers);
        assert_eq!(collected["set-cookie"], "a=1, b=2");
        assert_eq!(collected["x-one"], "1");
    }

    #[test]
    fn test_failure_record_serialization() {
        let value = serde_json::to_value(ResponseRecord::failure("boom")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "status": 0,
                "statusText": "Error",
                "headers": {},
                "data": null,
                "error": "boom"
            })
        );
    }
}
