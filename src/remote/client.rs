//! Blocking HTTP client for the catalog and update endpoints.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::request;
use super::RemoteError;
use crate::search::types::SearchResponse;
use crate::update::types::UpdateDescriptor;

/// HTTP request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Blocking client for the two remote calls: search and update-check.
pub struct CatalogClient {
    /// HTTP client.
    client: reqwest::blocking::Client,
    /// Search endpoint URL.
    search_endpoint: String,
    /// Update-check endpoint URL.
    update_endpoint: String,
    /// API key, empty when unset.
    api_key: String,
    /// Maximum results per search.
    max_results: u32,
}

impl CatalogClient {
    /// Creates a new catalog client.
    #[must_use]
    pub fn new(
        search_endpoint: &str,
        update_endpoint: &str,
        api_key: &str,
        max_results: u32,
    ) -> Self {
        assert!(!search_endpoint.is_empty(), "search endpoint must not be empty");
        assert!(!update_endpoint.is_empty(), "update endpoint must not be empty");

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("tunegrab/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self {
            client,
            search_endpoint: search_endpoint.to_string(),
            update_endpoint: update_endpoint.to_string(),
            api_key: api_key.to_string(),
            max_results,
        }
    }

    /// Runs one search call and decodes the response page.
    pub fn fetch_search(&self, query: &str) -> Result<SearchResponse, RemoteError> {
        let url = request::search_url(&self.search_endpoint, query, self.max_results, &self.api_key)?;

        debug!("[REMOTE] fetch_search: GET {}", url);
        let start = Instant::now();

        let response = self.client.get(url).send().map_err(|e| {
            warn!("[REMOTE] Search request failed: {}", e);
            RemoteError::Network(e.to_string())
        })?;

        let status = response.status();
        debug!("[REMOTE] Search response: {} in {:?}", status, start.elapsed());

        if !status.is_success() {
            warn!("[REMOTE] Search endpoint error: {}", status);
            return Err(RemoteError::Status(status.as_u16()));
        }

        let page: SearchResponse = response.json().map_err(|e| {
            warn!("[REMOTE] Failed to decode search response: {}", e);
            RemoteError::Decode(e.to_string())
        })?;

        info!(
            "[REMOTE] Search returned {} of {} result(s) in {:?}",
            page.items.len(),
            page.page_info.total_results,
            start.elapsed()
        );
        Ok(page)
    }

    /// Runs one update-check call and decodes the descriptor.
    pub fn fetch_update(&self) -> Result<UpdateDescriptor, RemoteError> {
        let url = request::update_check_url(&self.update_endpoint)?;

        debug!("[REMOTE] fetch_update: GET {}", url);
        let start = Instant::now();

        let response = self.client.get(url).send().map_err(|e| {
            warn!("[REMOTE] Update request failed: {}", e);
            RemoteError::Network(e.to_string())
        })?;

        let status = response.status();
        debug!("[REMOTE] Update response: {} in {:?}", status, start.elapsed());

        if !status.is_success() {
            warn!("[REMOTE] Update endpoint error: {}", status);
            return Err(RemoteError::Status(status.as_u16()));
        }

        let descriptor: UpdateDescriptor = response.json().map_err(|e| {
            warn!("[REMOTE] Failed to decode update descriptor: {}", e);
            RemoteError::Decode(e.to_string())
        })?;

        info!(
            "[REMOTE] Update check: version {} (code {})",
            descriptor.version_name, descriptor.version_code
        );
        Ok(descriptor)
    }

    /// Returns the search endpoint.
    #[must_use]
    pub fn search_endpoint(&self) -> &str {
        &self.search_endpoint
    }

    /// Returns the update endpoint.
    #[must_use]
    pub fn update_endpoint(&self) -> &str {
        &self.update_endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CatalogClient::new(
            "https://example.com/search",
            "https://example.com/update.json",
            "",
            10,
        );
        assert_eq!(client.search_endpoint(), "https://example.com/search");
        assert_eq!(client.update_endpoint(), "https://example.com/update.json");
    }

    #[test]
    #[should_panic(expected = "search endpoint must not be empty")]
    fn test_empty_endpoint_rejected() {
        let _ = CatalogClient::new("", "https://example.com/update.json", "", 10);
    }
}
