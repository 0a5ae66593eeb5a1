//! Engine configuration
//!
//! The API base defaults to the local json-server instance the screens were
//! developed against and can be overridden through `DESTINO_API_BASE`.

use crate::error::ConfigError;
use std::time::Duration;
use url::Url;

const DEFAULT_API_BASE: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Items per page used by the table screens unless the caller overrides it.
pub const DEFAULT_PAGE_SIZE: usize = 8;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub page_size: usize,
}

impl EngineConfig {
    /// Configuration from the environment, falling back to local defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("DESTINO_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::with_base_url(&raw)
    }

    pub fn with_base_url(raw: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(EngineConfig {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn page_size(mut self, size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        self.page_size = size;
        Ok(self)
    }
}
