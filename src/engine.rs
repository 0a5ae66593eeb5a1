//! Correlation engine facade
//!
//! Ties the store, resolver, filter, projector, and paginator together into
//! the surface the UI layer consumes: refresh, rows, page, ad hoc reference
//! lookups, and post-mutation invalidation.

use crate::catalog::spec_for;
use crate::config::EngineConfig;
use crate::entity::Resource;
use crate::error::{EngineResult, FetchResult};
use crate::filter::{apply_filters, FilterState};
use crate::http::ApiClient;
use crate::key::Key;
use crate::page::{paginate, Page};
use crate::project::{project_collection, Row};
use crate::resolve::{Resolution, Resolver};
use crate::store::{EntityStore, ResourceFetcher};
use std::sync::Arc;
use tracing::info;

pub struct CorrelationEngine {
    store: EntityStore,
}

impl CorrelationEngine {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        CorrelationEngine {
            store: EntityStore::new(fetcher),
        }
    }

    /// Engine over the configured HTTP API.
    pub fn connect(config: EngineConfig) -> EngineResult<Self> {
        let client = ApiClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Joined multi-fetch for everything a screen needs. Fails fast on the
    /// first endpoint error; on failure no collection is replaced.
    pub async fn refresh(&self, resources: &[Resource]) -> FetchResult<()> {
        self.store.load_many(resources).await
    }

    /// Refresh every resource the engine knows about.
    pub async fn refresh_all(&self) -> FetchResult<()> {
        self.refresh(&Resource::ALL).await
    }

    /// Re-fetch one collection after a mutation to it.
    ///
    /// Only the owner collection is re-fetched; rows referencing it pick up
    /// the change on their next projection, not eagerly.
    pub async fn invalidate(&self, resource: Resource) -> FetchResult<()> {
        info!(%resource, "re-fetching after mutation");
        self.store.load(resource).await.map(|_| ())
    }

    /// Filtered, unpaginated projection of one resource.
    ///
    /// Rows are rebuilt from the current snapshot on every call; a resource
    /// that never loaded projects to an empty sequence, and unloaded
    /// reference targets degrade to their fallback strings.
    pub fn rows(&self, resource: Resource, filter: &FilterState) -> Vec<Row> {
        let spec = spec_for(resource);
        let snapshot = self.store.snapshot();
        let base = project_collection(spec, &snapshot);
        apply_filters(&base, spec.search_fields, filter)
    }

    /// Paginated slice plus metadata over already filtered rows.
    pub fn page(&self, rows: &[Row], filter: &FilterState) -> Page {
        paginate(rows, filter.page, filter.page_size)
    }

    /// Ad hoc single-reference lookup, e.g. for a detail view.
    pub fn resolve_reference(&self, value: &Key, target: Resource) -> Resolution {
        let snapshot = self.store.snapshot();
        Resolver::new(&snapshot).resolve(value, target)
    }

    /// Count of rows matching a filter, for the screens' summary counters
    /// (pending requests, urgent requests, ...).
    pub fn count(&self, resource: Resource, filter: &FilterState) -> usize {
        self.rows(resource, filter).len()
    }
}
