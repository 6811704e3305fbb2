//! Explorer session tying together discovery, drafts and execution

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use endpoint_parser::{EndpointDescriptor, OpenApiParser};
use explorer_core::{EndpointKey, EndpointStore, ExplorerError, RequestDraft, Settings};

use crate::error::Result;
use crate::executor::{RequestExecutor, ResponseRecord};

/// One explorer session
///
/// Holds the endpoint store, the HTTP executor and the last response per
/// endpoint. Cloning shares all state.
#[derive(Clone)]
pub struct Explorer {
    store: EndpointStore,
    executor: RequestExecutor,
    settings: Arc<Settings>,
    responses: Arc<RwLock<HashMap<EndpointKey, ResponseRecord>>>,
}

impl Explorer {
    /// Create a session from settings
    pub fn new(settings: Settings) -> Result<Self> {
        let executor = RequestExecutor::new(settings.request_timeout())?;
        Ok(Self::with_executor(settings, executor))
    }

    /// Create a session with a preconfigured executor
    pub fn with_executor(settings: Settings, executor: RequestExecutor) -> Self {
        Self {
            store: EndpointStore::new(),
            executor,
            settings: Arc::new(settings),
            responses: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &EndpointStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register a base URL and load its endpoints
    ///
    /// Returns the normalized base URL and the number of endpoints found.
    /// An unreachable or malformed document yields zero endpoints.
    pub async fn add_base_url(&self, url: &str) -> Result<(String, usize)> {
        let base_url = self.store.add_base_url(url).await?;
        let count = self.refresh(&base_url).await;
        Ok((base_url, count))
    }

    /// Forget a base URL, its endpoints and their last responses
    pub async fn remove_base_url(&self, url: &str) -> Result<()> {
        self.store.remove_base_url(url).await?;

        let normalized = EndpointStore::normalize_base_url(url)?;
        self.responses
            .write()
            .await
            .retain(|key, _| key.base_url != normalized);
        Ok(())
    }

    /// Re-fetch the document of one base URL and replace its endpoints
    ///
    /// Nothing is stored if the base URL was removed before the fetch
    /// finished.
    pub async fn refresh(&self, base_url: &str) -> usize {
        let endpoints =
            OpenApiParser::fetch_endpoints(self.executor.client(), base_url, &self.settings.spec_path)
                .await;

        if endpoints.is_empty() {
            warn!("No endpoints loaded from {}", base_url);
        }

        self.store.replace_endpoints(base_url, endpoints).await
    }

    /// Refresh every known base URL concurrently; returns the total count
    pub async fn refresh_all(&self) -> usize {
        let base_urls = self.store.list_base_urls().await;
        let counts = join_all(base_urls.iter().map(|base_url| self.refresh(base_url))).await;

        let total: usize = counts.into_iter().sum();
        info!("Refreshed {} base URLs, {} endpoints", base_urls.len(), total);
        total
    }

    /// Select an endpoint and return a fresh draft for it
    pub async fn select(&self, key: &EndpointKey) -> Result<RequestDraft> {
        self.store.select_endpoint(Some(key)).await?;

        let endpoint = self
            .store
            .get_selected()
            .await
            .ok_or_else(|| ExplorerError::EndpointNotFound(key.to_string()))?;

        Ok(self.new_draft(&endpoint))
    }

    /// Fresh draft for an endpoint, seeded with the configured default headers
    pub fn new_draft(&self, endpoint: &EndpointDescriptor) -> RequestDraft {
        RequestDraft::with_headers(endpoint, self.settings.default_headers.clone())
    }

    /// Send a draft to the endpoint's own base URL
    pub async fn send(&self, endpoint: &EndpointDescriptor, draft: &RequestDraft) -> ResponseRecord {
        self.send_to(&endpoint.base_url, endpoint, draft).await
    }

    /// Send a draft to an explicit base URL
    ///
    /// The record replaces any earlier response kept for the endpoint.
    pub async fn send_to(
        &self,
        base_url: &str,
        endpoint: &EndpointDescriptor,
        draft: &RequestDraft,
    ) -> ResponseRecord {
        let record = self.executor.execute(endpoint, base_url, draft).await;

        self.responses
            .write()
            .await
            .insert(EndpointKey::of(endpoint), record.clone());

        record
    }

    /// Last response received for an endpoint
    pub async fn last_response(&self, key: &EndpointKey) -> Option<ResponseRecord> {
        self.responses.read().await.get(key).cloned()
    }
}
