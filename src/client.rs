//! Catalog HTTP client
//!
//! Consumer side of `GET /api/vehicles`. `CatalogSource` is the seam the
//! fallback controller fetches through; `CatalogClient` is the reqwest
//! implementation against a running server.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::VehicleRecord;
use crate::services::{QueryPage, VehicleQuery, ALL_TYPES};

/// Every variant sends the caller to its cache fallback
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,

    #[error("server answered with HTTP {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("could not decode catalog response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ClientError::Status(status.as_u16())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

/// Anything that can answer a catalog query
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_page(&self, query: &VehicleQuery) -> Result<QueryPage<VehicleRecord>, ClientError>;
}

pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// `base_url` is the server root, e.g. `http://localhost:10000`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn query_params(query: &VehicleQuery) -> Vec<(&'static str, String)> {
        vec![
            (
                "type",
                query.vehicle_type.clone().unwrap_or_else(|| ALL_TYPES.to_string()),
            ),
            ("search", query.search.clone()),
            ("sort", query.sort.as_str().to_string()),
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ]
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_page(&self, query: &VehicleQuery) -> Result<QueryPage<VehicleRecord>, ClientError> {
        let url = format!("{}/api/vehicles", self.base_url);
        debug!("🌐 GET {} (page {}, limit {})", url, query.page, query.limit);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&Self::query_params(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(response.json::<QueryPage<VehicleRecord>>().await?)
    }
}
