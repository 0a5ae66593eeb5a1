//! Error handling for the correlation engine
//!
//! This module provides idiomatic Rust error types using thiserror for
//! better error messages and proper error chain handling.
//!
//! Only fetch failures are surfaced to callers as errors. Unresolved
//! references and malformed fields are always recovered locally into display
//! fallbacks by the resolver and the projector; no code path in the engine
//! turns them into an `Err`.

use crate::entity::Resource;
use thiserror::Error;

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// A resource endpoint did not produce a usable snapshot.
///
/// The previous snapshot for that resource is always retained; a failed
/// fetch never installs a partial collection.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {resource} failed: {source}")]
    Http {
        resource: Resource,
        #[source]
        source: reqwest::Error,
    },

    #[error("Endpoint {resource} answered with status {status}")]
    Status { resource: Resource, status: u16 },

    #[error("Could not decode {resource} response body: {source}")]
    Decode {
        resource: Resource,
        #[source]
        source: reqwest::Error,
    },

    #[error("Endpoint {resource} did not return a JSON array")]
    NotAnArray { resource: Resource },
}

impl FetchError {
    /// The resource whose snapshot could not be refreshed.
    pub fn resource(&self) -> Resource {
        match self {
            FetchError::Http { resource, .. }
            | FetchError::Status { resource, .. }
            | FetchError::Decode { resource, .. }
            | FetchError::NotAnArray { resource } => *resource,
        }
    }
}

/// Engine configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Page size must be at least 1")]
    ZeroPageSize,

    #[error("Failed to build HTTP client: {reason}")]
    HttpClient { reason: String },
}

/// Result type aliases for convenience
pub type EngineResult<T> = Result<T, EngineError>;
pub type FetchResult<T> = Result<T, FetchError>;
