//! REST client for a colony exposing its work priorities over HTTP
//!
//! The optimizer is synchronous, so the client owns a tokio runtime and
//! blocks on each request at the backend boundary.

use crate::backend::{records_to_map, ColonyBackend, PriorityRecord};
use crate::core::error::{LaborError, Result};
use crate::entity::Worker;
use crate::optimizer::diff::{Change, PriorityMap};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::Runtime;

pub const DEFAULT_API_URL: &str = "http://localhost:8765";

pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    runtime: Runtime,
}

impl HttpBackend {
    /// Create a client with explicit configuration
    ///
    /// An empty token is treated as no token.
    pub fn new(base_url: String, api_token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.filter(|t| !t.trim().is_empty()),
            runtime: Runtime::new()?,
        })
    }

    /// Explicit base URL, token from COLONY_API_TOKEN
    pub fn with_url(base_url: String) -> Result<Self> {
        Self::new(base_url, std::env::var("COLONY_API_TOKEN").ok())
    }

    /// Create a client from environment variables
    ///
    /// Optional: COLONY_API_URL (defaults to a local colony on port 8765)
    /// Optional: COLONY_API_TOKEN (sent as a bearer token)
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("COLONY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        Self::with_url(base_url)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        tracing::debug!("GET {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| LaborError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LaborError::Backend(format!("{} returned {}: {}", path, status, error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| LaborError::Backend(e.to_string()))
    }

    async fn post_batch(&self, changes: &[Change]) -> Result<()> {
        let request = BatchRequest {
            changes: changes.iter().map(PriorityRecord::from).collect(),
        };
        let url = self.endpoint("work-priorities/batch");
        tracing::debug!("POST {} ({} changes)", url, changes.len());

        let response = self
            .authorize(self.client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| LaborError::Submission(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LaborError::Submission(format!("{}: {}", status, error_text)));
        }

        Ok(())
    }
}

impl ColonyBackend for HttpBackend {
    fn worker_roster(&self) -> Result<Vec<Worker>> {
        self.runtime.block_on(self.get_json("colonists"))
    }

    fn canonical_work_categories(&self) -> Result<Vec<String>> {
        self.runtime.block_on(self.get_json("work-types"))
    }

    fn current_assignments(&self) -> Result<PriorityMap> {
        let records: Vec<PriorityRecord> = self.runtime.block_on(self.get_json("work-priorities"))?;
        Ok(records_to_map(&records))
    }

    fn submit_priority_changes(&mut self, changes: &[Change]) -> Result<()> {
        if changes.is_empty() {
            tracing::debug!("No priority changes to submit");
            return Ok(());
        }
        self.runtime.block_on(self.post_batch(changes))
    }
}

#[derive(Serialize)]
struct BatchRequest {
    changes: Vec<PriorityRecord>,
}
