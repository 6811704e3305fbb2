//! Endpoint store holding extracted endpoints, the selection and known base URLs

use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ExplorerError, Result};
use endpoint_parser::{EndpointDescriptor, HttpMethod};

/// Identity of an endpoint across documents
///
/// Endpoint ids are only unique within one document, so the store keys
/// endpoints by base URL as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    pub base_url: String,
    pub method: HttpMethod,
    pub path: String,
}

impl EndpointKey {
    /// Key of an endpoint descriptor
    pub fn of(endpoint: &EndpointDescriptor) -> Self {
        Self {
            base_url: endpoint.base_url.clone(),
            method: endpoint.method,
            path: endpoint.path.clone(),
        }
    }
}

impl std::fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}{}", self.method, self.base_url, self.path)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    endpoints: IndexMap<EndpointKey, EndpointDescriptor>,
    selected: Option<EndpointKey>,
    base_urls: Vec<String>,
}

/// Shared handle to the endpoint store
///
/// Cloning the handle shares the same state. Writers do not coordinate:
/// the last write wins.
#[derive(Debug, Clone, Default)]
pub struct EndpointStore {
    state: Arc<RwLock<StoreState>>,
}

impl EndpointStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an endpoint, replacing one with the same key in place
    pub async fn add_endpoint(&self, endpoint: EndpointDescriptor) {
        let mut state = self.state.write().await;
        state.endpoints.insert(EndpointKey::of(&endpoint), endpoint);
    }

    /// Remove an endpoint; clears the selection if it pointed at it
    pub async fn remove_endpoint(&self, key: &EndpointKey) -> Result<EndpointDescriptor> {
        let mut state = self.state.write().await;

        let removed = state
            .endpoints
            .shift_remove(key)
            .ok_or_else(|| ExplorerError::EndpointNotFound(key.to_string()))?;

        if state.selected.as_ref() == Some(key) {
            state.selected = None;
        }

        debug!("Removed endpoint {}", key);
        Ok(removed)
    }

    /// All endpoints, in insertion order
    pub async fn list_endpoints(&self) -> Vec<EndpointDescriptor> {
        let state = self.state.read().await;
        state.endpoints.values().cloned().collect()
    }

    /// Endpoints extracted from one base URL
    pub async fn endpoints_for(&self, base_url: &str) -> Vec<EndpointDescriptor> {
        let state = self.state.read().await;
        state
            .endpoints
            .iter()
            .filter(|(key, _)| key.base_url == base_url)
            .map(|(_, endpoint)| endpoint.clone())
            .collect()
    }

    /// Look up an endpoint by its document-local id
    pub async fn find_by_id(&self, base_url: &str, id: &str) -> Option<EndpointDescriptor> {
        let state = self.state.read().await;
        state
            .endpoints
            .values()
            .find(|e| e.base_url == base_url && e.id == id)
            .cloned()
    }

    /// Endpoints whose name or path contains the term, ignoring case
    pub async fn search(&self, term: &str) -> Vec<EndpointDescriptor> {
        let term = term.to_lowercase();
        let state = self.state.read().await;
        state
            .endpoints
            .values()
            .filter(|e| e.name.to_lowercase().contains(&term) || e.path.to_lowercase().contains(&term))
            .cloned()
            .collect()
    }

    /// Replace every endpoint of a base URL with a freshly extracted set
    ///
    /// The selection survives only if its key is part of the new set. A base
    /// URL that is no longer registered (removed while its document was
    /// being fetched) stores nothing and returns 0.
    pub async fn replace_endpoints(&self, base_url: &str, endpoints: Vec<EndpointDescriptor>) -> usize {
        let mut state = self.state.write().await;

        if !state.base_urls.iter().any(|known| known == base_url) {
            warn!("Dropping {} endpoints for unregistered base URL {}", endpoints.len(), base_url);
            return 0;
        }

        state.endpoints.retain(|key, _| key.base_url != base_url);
        let count = endpoints.len();
        for endpoint in endpoints {
            state.endpoints.insert(EndpointKey::of(&endpoint), endpoint);
        }

        let selection_gone = state
            .selected
            .as_ref()
            .is_some_and(|key| !state.endpoints.contains_key(key));
        if selection_gone {
            debug!("Selected endpoint disappeared after refreshing {}", base_url);
            state.selected = None;
        }

        info!("Stored {} endpoints for {}", count, base_url);
        count
    }

    /// Select an endpoint, or clear the selection with `None`
    pub async fn select_endpoint(&self, key: Option<&EndpointKey>) -> Result<()> {
        let mut state = self.state.write().await;

        match key {
            Some(key) if !state.endpoints.contains_key(key) => {
                Err(ExplorerError::EndpointNotFound(key.to_string()))
            }
            Some(key) => {
                state.selected = Some(key.clone());
                Ok(())
            }
            None => {
                state.selected = None;
                Ok(())
            }
        }
    }

    /// The selected endpoint, if any
    pub async fn get_selected(&self) -> Option<EndpointDescriptor> {
        let state = self.state.read().await;
        state
            .selected
            .as_ref()
            .and_then(|key| state.endpoints.get(key))
            .cloned()
    }

    /// Register a base URL; returns its normalized form
    ///
    /// Adding a known base URL again is a no-op.
    pub async fn add_base_url(&self, url: &str) -> Result<String> {
        let normalized = Self::normalize_base_url(url)?;

        let mut state = self.state.write().await;
        if !state.base_urls.contains(&normalized) {
            info!("Adding base URL: {}", normalized);
            state.base_urls.push(normalized.clone());
        }

        Ok(normalized)
    }

    /// Forget a base URL together with its endpoints
    pub async fn remove_base_url(&self, url: &str) -> Result<()> {
        let normalized = Self::normalize_base_url(url)?;

        let mut state = self.state.write().await;
        let before = state.base_urls.len();
        state.base_urls.retain(|known| known != &normalized);
        if state.base_urls.len() == before {
            return Err(ExplorerError::UnknownBaseUrl(normalized));
        }

        state.endpoints.retain(|key, _| key.base_url != normalized);
        if state
            .selected
            .as_ref()
            .is_some_and(|key| key.base_url == normalized)
        {
            state.selected = None;
        }

        info!("Removed base URL: {}", normalized);
        Ok(())
    }

    /// Known base URLs, in the order they were added
    pub async fn list_base_urls(&self) -> Vec<String> {
        let state = self.state.read().await;
        state.base_urls.clone()
    }

    /// Validate an absolute http(s) URL and strip trailing slashes
    pub fn normalize_base_url(url: &str) -> Result<String> {
        let trimmed = url.trim();

        let parsed = url::Url::parse(trimmed).map_err(|e| ExplorerError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ExplorerError::InvalidBaseUrl {
                url: trimmed.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(trimmed.trim_end_matches('/').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn endpoint(base_url: &str, method: HttpMethod, path: &str, name: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            id: EndpointDescriptor::make_id(method, path),
            name: name.to_string(),
            method,
            path: path.to_string(),
            description: String::new(),
            parameters: None,
            request_body: None,
            responses: IndexMap::new(),
            security: None,
            base_url: base_url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let store = EndpointStore::new();
        store.add_endpoint(endpoint("http://a", HttpMethod::Get, "/pets", "List pets")).await;
        store.add_endpoint(endpoint("http://a", HttpMethod::Post, "/pets", "Create pet")).await;

        let endpoints = store.list_endpoints().await;
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].id, "get-/pets");
        assert_eq!(endpoints[1].id, "post-/pets");
    }

    #[tokio::test]
    async fn test_same_route_on_two_base_urls_does_not_collide() {
        let store = EndpointStore::new();
        store.add_endpoint(endpoint("http://a", HttpMethod::Get, "/pets", "A pets")).await;
        store.add_endpoint(endpoint("http://b", HttpMethod::Get, "/pets", "B pets")).await;

        assert_eq!(store.list_endpoints().await.len(), 2);
        assert_eq!(store.find_by_id("http://b", "get-/pets").await.unwrap().name, "B pets");
    }

    #[tokio::test]
    async fn test_select_and_remove() {
        let store = EndpointStore::new();
        let pets = endpoint("http://a", HttpMethod::Get, "/pets", "List pets");
        let key = EndpointKey::of(&pets);
        store.add_endpoint(pets).await;

        store.select_endpoint(Some(&key)).await.unwrap();
        assert_eq!(store.get_selected().await.unwrap().id, "get-/pets");

        store.remove_endpoint(&key).await.unwrap();
        assert!(store.get_selected().await.is_none());
        assert!(matches!(
            store.remove_endpoint(&key).await,
            Err(ExplorerError::EndpointNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_select_unknown_endpoint_fails() {
        let store = EndpointStore::new();
        let key = EndpointKey {
            base_url: "http://a".to_string(),
            method: HttpMethod::Get,
            path: "/nope".to_string(),
        };

        assert!(store.select_endpoint(Some(&key)).await.is_err());
        store.select_endpoint(None).await.unwrap();
        assert!(store.get_selected().await.is_none());
    }

    #[tokio::test]
    async fn test_replace_endpoints_keeps_surviving_selection() {
        let store = EndpointStore::new();
        store.add_base_url("http://a").await.unwrap();
        let pets = endpoint("http://a", HttpMethod::Get, "/pets", "List pets");
        let key = EndpointKey::of(&pets);
        store.add_endpoint(pets.clone()).await;
        store.add_endpoint(endpoint("http://b", HttpMethod::Get, "/other", "Other")).await;
        store.select_endpoint(Some(&key)).await.unwrap();

        let count = store
            .replace_endpoints(
                "http://a",
                vec![pets, endpoint("http://a", HttpMethod::Delete, "/pets/{id}", "Delete pet")],
            )
            .await;

        assert_eq!(count, 2);
        assert_eq!(store.endpoints_for("http://a").await.len(), 2);
        assert_eq!(store.endpoints_for("http://b").await.len(), 1);
        assert!(store.get_selected().await.is_some());

        store.replace_endpoints("http://a", Vec::new()).await;
        assert!(store.get_selected().await.is_none());
    }

    #[tokio::test]
    async fn test_replace_endpoints_after_removal_is_ignored() {
        let store = EndpointStore::new();
        store.add_base_url("http://a").await.unwrap();
        store.remove_base_url("http://a").await.unwrap();

        let count = store
            .replace_endpoints("http://a", vec![endpoint("http://a", HttpMethod::Get, "/pets", "List pets")])
            .await;

        assert_eq!(count, 0);
        assert!(store.list_endpoints().await.is_empty());
        assert!(store.list_base_urls().await.is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_name_or_path() {
        let store = EndpointStore::new();
        store.add_endpoint(endpoint("http://a", HttpMethod::Get, "/pets", "List animals")).await;
        store.add_endpoint(endpoint("http://a", HttpMethod::Get, "/users", "List users")).await;

        assert_eq!(store.search("PETS").await.len(), 1);
        assert_eq!(store.search("list").await.len(), 2);
        assert!(store.search("orders").await.is_empty());
    }

    #[tokio::test]
    async fn test_base_urls() {
        let store = EndpointStore::new();

        let added = store.add_base_url("http://localhost:8001/").await.unwrap();
        assert_eq!(added, "http://localhost:8001");
        store.add_base_url("http://localhost:8001").await.unwrap();
        store.add_base_url("https://api.example.com").await.unwrap();
        assert_eq!(
            store.list_base_urls().await,
            vec!["http://localhost:8001", "https://api.example.com"]
        );

        assert!(matches!(
            store.add_base_url("not a url").await,
            Err(ExplorerError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            store.add_base_url("ftp://files.example.com").await,
            Err(ExplorerError::InvalidBaseUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_base_url_drops_its_endpoints() {
        let store = EndpointStore::new();
        store.add_base_url("http://a").await.unwrap();
        let pets = endpoint("http://a", HttpMethod::Get, "/pets", "List pets");
        let key = EndpointKey::of(&pets);
        store.add_endpoint(pets).await;
        store.select_endpoint(Some(&key)).await.unwrap();

        store.remove_base_url("http://a/").await.unwrap();

        assert!(store.list_base_urls().await.is_empty());
        assert!(store.list_endpoints().await.is_empty());
        assert!(store.get_selected().await.is_none());
        assert!(matches!(
            store.remove_base_url("http://a").await,
            Err(ExplorerError::UnknownBaseUrl(_))
        ));
    }
}
