//! HTTP client for the flat REST resource endpoints
//!
//! One GET per resource returning the entire flat JSON array; the API offers
//! no server-side filtering or joins, so everything beyond the fetch happens
//! in memory. Mutations (create/update/patch/delete) are plain fire-and-
//! forget requests: a failure surfaces to the caller and the engine's only
//! follow-up on success is a re-fetch of the owning collection.

use crate::config::EngineConfig;
use crate::entity::{entities_from_array, Entity, Resource};
use crate::error::{ConfigError, FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

pub struct ApiClient {
    http: Client,
    config: EngineConfig,
}

impl ApiClient {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;
        Ok(ApiClient { http, config })
    }

    fn list_url(&self, resource: Resource) -> String {
        format!("{}/{}", self.config.base_url.as_str().trim_end_matches('/'), resource.path())
    }

    fn item_url(&self, resource: Resource, id: &str) -> String {
        format!("{}/{}", self.list_url(resource), id)
    }

    /// POST a new record.
    pub async fn create(&self, resource: Resource, body: &Value) -> FetchResult<Value> {
        let url = self.list_url(resource);
        debug!(%resource, "creating record");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| FetchError::Http { resource, source })?;
        Self::read_json(resource, response).await
    }

    /// PUT a full replacement of one record.
    pub async fn update(&self, resource: Resource, id: &str, body: &Value) -> FetchResult<Value> {
        let url = self.item_url(resource, id);
        let response = self
            .http
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| FetchError::Http { resource, source })?;
        Self::read_json(resource, response).await
    }

    /// PATCH a partial update (e.g. just a request's status).
    pub async fn patch(&self, resource: Resource, id: &str, body: &Value) -> FetchResult<Value> {
        let url = self.item_url(resource, id);
        let response = self
            .http
            .patch(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| FetchError::Http { resource, source })?;
        Self::read_json(resource, response).await
    }

    /// DELETE one record.
    pub async fn delete(&self, resource: Resource, id: &str) -> FetchResult<()> {
        let url = self.item_url(resource, id);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|source| FetchError::Http { resource, source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                resource,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn read_json(resource: Resource, response: reqwest::Response) -> FetchResult<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                resource,
                status: status.as_u16(),
            });
        }
        response
            .json()
            .await
            .map_err(|source| FetchError::Decode { resource, source })
    }
}

#[async_trait]
impl crate::store::ResourceFetcher for ApiClient {
    async fn fetch_all(&self, resource: Resource) -> FetchResult<Vec<Entity>> {
        let url = self.list_url(resource);
        debug!(%resource, %url, "fetching collection");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Http { resource, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                resource,
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|source| FetchError::Decode { resource, source })?;

        let Value::Array(items) = body else {
            return Err(FetchError::NotAnArray { resource });
        };

        let (entities, skipped) = entities_from_array(items);
        if skipped > 0 {
            warn!(%resource, skipped, "dropped non-object elements from response array");
        }
        Ok(entities)
    }
}
