//! Destino Engine - entity correlation over flat REST resources
//!
//! The Destino Expertos API serves five flat collections (clients,
//! professionals, services, requests, reviews) with no server-side joins,
//! filtering, or pagination, and with loose identifier typing. This crate is
//! the in-memory, read-mostly layer the screens sit on:
//!
//! load -> resolve references -> project display rows -> filter -> paginate
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use destino_engine::{ApiClient, CorrelationEngine, EngineConfig, FilterState, Resource};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = EngineConfig::from_env()?;
//! let engine = CorrelationEngine::new(Arc::new(ApiClient::new(config)?));
//!
//! engine.refresh_all().await?;
//! let filter = FilterState::new().with_search("plumb");
//! let rows = engine.rows(Resource::Reviews, &filter);
//! let page = engine.page(&rows, &filter);
//! println!("{}", page.range_label);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Identifier normalization and the raw entity model
pub mod entity;
pub mod key;

// Snapshot store and the fetcher seam
pub mod store;

// HTTP client for the resource endpoints
pub mod http;

// Resolution, projection, filtering, pagination
pub mod filter;
pub mod page;
pub mod project;
pub mod resolve;

// The five concrete resource recipes
pub mod catalog;

// Facade and configuration
pub mod config;
pub mod engine;

pub use config::EngineConfig;
pub use engine::CorrelationEngine;
pub use entity::{Collection, Entity, Resource};
pub use error::{ConfigError, EngineError, EngineResult, FetchError, FetchResult};
pub use filter::{DateRange, FilterState};
pub use http::ApiClient;
pub use key::Key;
pub use page::Page;
pub use project::Row;
pub use resolve::Resolution;
pub use store::{EntityStore, ResourceFetcher, StoreSnapshot};
